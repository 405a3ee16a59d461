// crates/ef_physics/tests/dissipation_properties.rs
//!
//! 耗散算子的物理性质测试
//!
//! 守恒、方向反对称、零跳跃、均匀来流、高马赫数极限下与经典 Roe 一致、
//! 低马赫数预处理效果、数值崩溃检测

use ef_config::DissipationConfig;
use ef_foundation::EfError;
use ef_mesh::{EdgeMesh, RectMeshGenerator};
use ef_physics::{
    compute_dissipation, entropy_correction, ConservativeVars, DependentVars, DissipationAccumulator,
    FlowField, FlowState, GeometryProvider, PerfectGas, RoeDissipation,
};
use glam::DVec2;

// ============================================================
// 辅助函数
// ============================================================

fn field_from(gas: &PerfectGas, state: FlowState) -> FlowField {
    let dependent = gas.update_dependent(&state);
    FlowField::new(state, dependent).unwrap()
}

fn bumpy_state(gas: &PerfectGas, mesh: &EdgeMesh) -> FlowState {
    FlowState::from_fn(mesh.n_nodes(), |i| {
        let p = mesh.nodes()[i];
        let s = (7.0 * p.x).sin() * (5.0 * p.y).cos();
        gas.conservative_from_primitive(1.2 + 0.2 * s, 80.0 + 30.0 * s, -20.0 * s, 1.0e5 * (1.0 + 0.1 * s))
    })
}

/// 内部节点扰动后的非均匀网格
fn perturbed_mesh(n: usize) -> EdgeMesh {
    let base = RectMeshGenerator::square(n, 1.0).build().unwrap();
    let h = 1.0 / n as f64;
    let nodes: Vec<DVec2> = base
        .nodes()
        .iter()
        .enumerate()
        .map(|(k, p)| {
            let interior = p.x > 1e-12 && p.x < 1.0 - 1e-12 && p.y > 1e-12 && p.y < 1.0 - 1e-12;
            if interior {
                let t = k as f64;
                *p + DVec2::new(0.2 * h * (1.3 * t).sin(), 0.2 * h * (0.7 * t).cos())
            } else {
                *p
            }
        })
        .collect();
    EdgeMesh::from_triangles(nodes, base.triangles().to_vec()).unwrap()
}

fn node(gas: &PerfectGas, rho: f64, u: f64, v: f64, p: f64) -> (ConservativeVars, DependentVars) {
    let cv = gas.conservative_from_primitive(rho, u, v, p);
    (cv, gas.dependent(&cv))
}

/// 经典 Roe 耗散 ½β·ds·|A|ΔW（按波分解）
fn classical_roe(
    gas: &PerfectGas,
    left: (f64, f64, f64, f64),
    right: (f64, f64, f64, f64),
    sij: DVec2,
    eps: f64,
) -> [f64; 4] {
    let (rl, ul, vl, pl) = left;
    let (rr, ur, vr, pr) = right;
    let g = gas.gamma;
    let hl = g / (g - 1.0) * pl / rl + 0.5 * (ul * ul + vl * vl);
    let hr = g / (g - 1.0) * pr / rr + 0.5 * (ur * ur + vr * vr);

    let rho = (rl * rr).sqrt();
    let dd = rho / rl;
    let w = 1.0 / (1.0 + dd);
    let u = (ul + dd * ur) * w;
    let v = (vl + dd * vr) * w;
    let h = (hl + dd * hr) * w;
    let q2 = u * u + v * v;
    let c = ((g - 1.0) * (h - 0.5 * q2)).sqrt();

    let ds = sij.length();
    let n = sij / ds;
    let vn = u * n.x + v * n.y;
    let delta = eps * c;

    let (dr, dp, du, dv) = (rr - rl, pr - pl, ur - ul, vr - vl);
    let dvn = du * n.x + dv * n.y;

    let a1 = entropy_correction(vn - c, delta) * (dp - rho * c * dvn) / (2.0 * c * c);
    let a2 = entropy_correction(vn, delta);
    let a3 = entropy_correction(vn + c, delta) * (dp + rho * c * dvn) / (2.0 * c * c);
    let wr = dr - dp / (c * c);

    let f = [
        a1 + a2 * wr + a3,
        a1 * (u - c * n.x) + a2 * (wr * u + rho * (du - dvn * n.x)) + a3 * (u + c * n.x),
        a1 * (v - c * n.y) + a2 * (wr * v + rho * (dv - dvn * n.y)) + a3 * (v + c * n.y),
        a1 * (h - c * vn) + a2 * (wr * 0.5 * q2 + rho * (u * du + v * dv - vn * dvn)) + a3 * (h + c * vn),
    ];
    f.map(|x| 0.5 * ds * x)
}

// ============================================================
// 守恒与反对称
// ============================================================

#[test]
fn test_global_conservation() {
    let gas = PerfectGas::default();
    let mesh = perturbed_mesh(10);
    let field = field_from(&gas, bumpy_state(&gas, &mesh));

    let mut acc = DissipationAccumulator::new(mesh.n_nodes());
    compute_dissipation(&mesh, &field, &DissipationConfig::default(), &mut acc).unwrap();

    let scale = acc.max_abs();
    assert!(scale > 0.0);
    let total = acc.total();
    for x in [total.dens, total.xmom, total.ymom, total.ener] {
        assert!(x.abs() < 1e-12 * scale * mesh.n_nodes() as f64, "total = {}", x);
    }
}

#[test]
fn test_reversed_orientation_gives_same_result() {
    let gas = PerfectGas::default();
    let mesh = RectMeshGenerator::square(6, 1.0).build().unwrap();
    let field = field_from(&gas, bumpy_state(&gas, &mesh));

    // 每条边反向：(j, i)，面向量取反
    let edges: Vec<(usize, usize)> = mesh.edges().iter().map(|&(i, j)| (j, i)).collect();
    let faces: Vec<DVec2> = (0..mesh.n_edges()).map(|e| -mesh.face_vector(e)).collect();
    let reversed = EdgeMesh::from_edges(mesh.nodes().to_vec(), edges, faces).unwrap();

    let config = DissipationConfig::default();
    let mut a = DissipationAccumulator::new(mesh.n_nodes());
    let mut b = DissipationAccumulator::new(mesh.n_nodes());
    compute_dissipation(&mesh, &field, &config, &mut a).unwrap();
    compute_dissipation(&reversed, &field, &config, &mut b).unwrap();

    let scale = a.max_abs();
    for i in 0..mesh.n_nodes() {
        assert!((a.dens[i] - b.dens[i]).abs() < 1e-11 * scale);
        assert!((a.xmom[i] - b.xmom[i]).abs() < 1e-11 * scale);
        assert!((a.ymom[i] - b.ymom[i]).abs() < 1e-11 * scale);
        assert!((a.ener[i] - b.ener[i]).abs() < 1e-11 * scale);
    }
}

// ============================================================
// 均匀场
// ============================================================

#[test]
fn test_uniform_freestream_is_zero() {
    let gas = PerfectGas::default();
    let cv = gas.conservative_from_primitive(1.0, 0.5, 0.0, 1.0 / 1.4);

    let mut precond = DissipationConfig::preconditioned(1.0, 0.1);
    precond.dissipation_blend = 0.7;

    for mesh in [RectMeshGenerator::square(5, 1.0).build().unwrap(), perturbed_mesh(7)] {
        let field = field_from(&gas, FlowState::uniform(mesh.n_nodes(), cv));
        for config in [DissipationConfig::default(), precond] {
            let mut acc = DissipationAccumulator::new(mesh.n_nodes());
            compute_dissipation(&mesh, &field, &config, &mut acc).unwrap();
            assert_eq!(acc.max_abs(), 0.0);
        }
    }
}

#[test]
fn test_accumulates_without_reset() {
    // 累加器不由耗散遍历清零
    let gas = PerfectGas::default();
    let mesh = RectMeshGenerator::square(3, 1.0).build().unwrap();
    let field = field_from(&gas, FlowState::uniform(mesh.n_nodes(), gas.freestream(0.5, 0.0, 1.0e5, 1.2)));

    let mut acc = DissipationAccumulator::new(mesh.n_nodes());
    acc.dens.fill(2.5);
    compute_dissipation(&mesh, &field, &DissipationConfig::default(), &mut acc).unwrap();
    assert!(acc.dens.iter().all(|&x| x == 2.5));
}

// ============================================================
// 经典 Roe 极限
// ============================================================

#[test]
fn test_supersonic_matches_classical_roe() {
    // 等密度、等速度、不等压力：Roe 平均与状态方程自洽
    let gas = PerfectGas::default();
    let left = (1.0, 500.0, 100.0, 1.0e5);
    let right = (1.0, 500.0, 100.0, 1.2e5);
    let (cl, dl) = node(&gas, left.0, left.1, left.2, left.3);
    let (cr, dr) = node(&gas, right.0, right.1, right.2, right.3);
    let sij = DVec2::new(0.3, 0.4);

    let expected = classical_roe(&gas, left, right, sij, 0.05);
    for config in [
        DissipationConfig::default(),
        DissipationConfig::preconditioned(1.0, 0.1),
    ] {
        let kernel = RoeDissipation::new(&config).unwrap();
        let flux = kernel.edge_flux(&cl, &dl, &cr, &dr, sij);
        let got = [flux.dens, flux.xmom, flux.ymom, flux.ener];
        for (g, e) in got.iter().zip(&expected) {
            assert!((g - e).abs() < 1e-9 * e.abs().max(1e-6), "got {} expected {}", g, e);
        }
    }
}

#[test]
fn test_density_jump_at_rest_matches_classical_roe() {
    let gas = PerfectGas::default();
    let left = (1.0, 0.0, 0.0, 1.0e5);
    let right = (1.5, 0.0, 0.0, 1.0e5);
    let (cl, dl) = node(&gas, left.0, left.1, left.2, left.3);
    let (cr, dr) = node(&gas, right.0, right.1, right.2, right.3);

    let expected = classical_roe(&gas, left, right, DVec2::X, 0.05);
    let flux = RoeDissipation::new(&DissipationConfig::default())
        .unwrap()
        .edge_flux(&cl, &dl, &cr, &dr, DVec2::X);

    assert!((flux.dens - expected[0]).abs() < 1e-9 * expected[0].abs());
    assert!(flux.xmom.abs() < 1e-9);
    assert!(flux.ymom.abs() < 1e-9);
    // 能量分量只剩舍入误差
    assert!(flux.ener.abs() < 1e-6);
}

// ============================================================
// 熵修正
// ============================================================

#[test]
fn test_entropy_fix_continuity() {
    for delta in [1e-3, 0.5, 17.0] {
        let below = entropy_correction(delta * (1.0 - 1e-12), delta);
        let at = entropy_correction(delta, delta);
        let above = entropy_correction(delta * (1.0 + 1e-12), delta);
        assert!((below - at).abs() < 1e-10 * delta);
        assert!((above - at).abs() < 1e-10 * delta);
        assert!((entropy_correction(0.0, delta) - 0.5 * delta).abs() < 1e-15 * delta.max(1.0));
        assert!((entropy_correction(-delta, delta) - delta).abs() < 1e-15 * delta.max(1.0));
    }
}

// ============================================================
// 低马赫数
// ============================================================

#[test]
fn test_low_mach_velocity_jump_damping_reduced() {
    // 低马赫数速度跳跃：未预处理时动量耗散按声速缩放，预处理后按流速缩放
    let gas = PerfectGas::default();
    let (cl, dl) = node(&gas, 1.2, 3.0, 0.0, 1.0e5);
    let (cr, dr) = node(&gas, 1.2, 3.5, 0.0, 1.0e5);

    let plain = RoeDissipation::new(&DissipationConfig::default())
        .unwrap()
        .edge_flux(&cl, &dl, &cr, &dr, DVec2::X);
    let precond = RoeDissipation::new(&DissipationConfig::preconditioned(1.0, 0.01))
        .unwrap()
        .edge_flux(&cl, &dl, &cr, &dr, DVec2::X);

    assert!(plain.xmom > 0.0);
    assert!(precond.xmom > 0.0);
    assert!(precond.xmom < 0.1 * plain.xmom);
}

// ============================================================
// 数值崩溃
// ============================================================

#[test]
fn test_negative_pressure_detected_after_pass() {
    let gas = PerfectGas::default();
    let mesh = RectMeshGenerator::square(3, 1.0).build().unwrap();
    let mut state = FlowState::uniform(mesh.n_nodes(), gas.freestream(0.5, 0.0, 1.0e5, 1.2));
    // 负密度使相邻边的 Roe 平均为 NaN
    let bad = 5;
    state.dens[bad] = -1.2;
    let field = field_from(&gas, state);

    let mut acc = DissipationAccumulator::new(mesh.n_nodes());
    compute_dissipation(&mesh, &field, &DissipationConfig::default(), &mut acc).unwrap();

    let err = acc.check_finite().unwrap_err();
    assert!(err.is_numerical_breakdown());
    assert!(matches!(err, EfError::NumericalBreakdown { .. }));
}

#[test]
fn test_invalid_config_rejected_before_pass() {
    let gas = PerfectGas::default();
    let mesh = RectMeshGenerator::square(2, 1.0).build().unwrap();
    let field = field_from(&gas, FlowState::uniform(mesh.n_nodes(), gas.freestream(0.5, 0.0, 1.0e5, 1.2)));

    let mut config = DissipationConfig::default();
    config.dissipation_blend = 1.5;
    let mut acc = DissipationAccumulator::new(mesh.n_nodes());
    let err = compute_dissipation(&mesh, &field, &config, &mut acc).unwrap_err();
    assert!(err.is_config_error());
}
