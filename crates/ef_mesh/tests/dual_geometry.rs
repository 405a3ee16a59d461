// crates/ef_mesh/tests/dual_geometry.rs
//!
//! 中位对偶几何测试
//!
//! 非均匀三角网格上的对偶面闭合、控制体积守恒与边着色

use ef_mesh::{EdgeColoring, EdgeMesh, GeometryProvider, MeshError, RectMeshGenerator};
use glam::DVec2;

fn jittered(nx: usize, ny: usize) -> EdgeMesh {
    let base = RectMeshGenerator::new(nx, ny, 2.0, 1.0).build().unwrap();
    let hx = 2.0 / nx as f64;
    let hy = 1.0 / ny as f64;
    let nodes: Vec<DVec2> = base
        .nodes()
        .iter()
        .enumerate()
        .map(|(k, p)| {
            let interior = p.x > 1e-12 && p.x < 2.0 - 1e-12 && p.y > 1e-12 && p.y < 1.0 - 1e-12;
            if interior {
                let t = k as f64;
                *p + DVec2::new(0.15 * hx * (2.1 * t).sin(), 0.15 * hy * (1.7 * t).cos())
            } else {
                *p
            }
        })
        .collect();
    EdgeMesh::from_triangles(nodes, base.triangles().to_vec()).unwrap()
}

#[test]
fn test_jittered_mesh_is_valid() {
    let mesh = jittered(12, 7);
    let report = mesh.validate();
    assert!(report.is_valid(), "{}", report);
    assert!(!report.has_warnings(), "{}", report);
}

#[test]
fn test_dual_volumes_cover_domain() {
    let mesh = jittered(10, 10);
    assert!((mesh.total_volume() - 2.0).abs() < 1e-12);
    assert!(mesh.node_volumes().iter().all(|&v| v > 0.0));
}

#[test]
fn test_face_vectors_point_from_i_to_j() {
    let mesh = jittered(6, 5);
    for e in 0..mesh.n_edges() {
        let (i, j) = mesh.edge_nodes(e);
        assert!(i < j);
        let d = mesh.nodes()[j] - mesh.nodes()[i];
        assert!(mesh.face_vector(e).dot(d) > 0.0);
        assert!(mesh.face_area(e) > 0.0);
    }
}

#[test]
fn test_coloring_on_jittered_mesh() {
    let mesh = jittered(9, 9);
    let coloring = EdgeColoring::color(&mesh);
    assert!(coloring.is_valid(&mesh));
    assert!(coloring.balance_factor() > 0.0);
}

#[test]
fn test_non_manifold_edge_rejected() {
    // 三个三角形共用边 (0, 1)
    let nodes = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(0.5, 1.0),
        DVec2::new(0.5, -1.0),
        DVec2::new(0.5, 2.0),
    ];
    let triangles = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];
    let err = EdgeMesh::from_triangles(nodes, triangles).unwrap_err();
    assert!(matches!(err, MeshError::InvalidTopology { .. }));
}
