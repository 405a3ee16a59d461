// crates/ef_mesh/src/edge_mesh.rs

//! 边网格
//!
//! 从三角形网格构建边基数据结构。每条内部边由两个三角形共享，
//! 中线对偶控制体在每个三角形内贡献一段"边中点 → 三角形形心"的面。
//!
//! # 数据布局
//!
//! ```text
//!        k
//!       / \
//!      /   \
//!     /  g  \        g: 三角形形心
//!    /   |   \       m: 边 ij 中点
//!   i----m----j      对偶面 m→g 的法向从 i 指向 j
//! ```
//!
//! 所有数组按 SoA 布局存储，构建后只读。

use std::collections::HashMap;

use ef_foundation::float::MIN_AREA;
use ef_foundation::validation::{
    check_finite, check_positive, ValidationError, ValidationReport, ValidationWarning,
};
use glam::DVec2;
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::traits::GeometryProvider;

/// 对偶控制体闭合检查的相对容差
const CLOSURE_TOLERANCE: f64 = 1e-10;

/// 边网格（只读）
#[derive(Debug, Clone)]
pub struct EdgeMesh {
    /// 节点坐标
    nodes: Vec<DVec2>,
    /// 三角形节点
    triangles: Vec<[usize; 3]>,
    /// 边端点 (i, j)，i < j
    edges: Vec<(usize, usize)>,
    /// 对偶面向量，从 i 指向 j
    face_vectors: Vec<DVec2>,
    /// 边是否位于边界（只属于一个三角形）
    boundary_edges: Vec<bool>,
    /// 节点对偶控制体面积
    node_volumes: Vec<f64>,
}

impl EdgeMesh {
    /// 由节点坐标和三角形构建边网格
    ///
    /// 三角形可为任意绕向；面积小于 `MIN_AREA` 的三角形视为退化并拒绝。
    pub fn from_triangles(nodes: Vec<DVec2>, triangles: Vec<[usize; 3]>) -> MeshResult<Self> {
        let n_nodes = nodes.len();

        for (t, tri) in triangles.iter().enumerate() {
            for &v in tri {
                if v >= n_nodes {
                    return Err(MeshError::node_out_of_range(
                        format!("三角形 {}", t),
                        v,
                        n_nodes,
                    ));
                }
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return Err(MeshError::invalid_topology(
                    "from_triangles",
                    format!("三角形 {} 含重复节点 {:?}", t, tri),
                ));
            }
        }

        let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges: Vec<(usize, usize)> = Vec::new();
        let mut face_vectors: Vec<DVec2> = Vec::new();
        let mut share_count: Vec<u32> = Vec::new();
        let mut node_volumes = vec![0.0; n_nodes];

        for (t, tri) in triangles.iter().enumerate() {
            let [a, b, c] = *tri;
            let (pa, pb, pc) = (nodes[a], nodes[b], nodes[c]);

            let area = 0.5 * (pb - pa).perp_dot(pc - pa);
            if area.abs() < MIN_AREA {
                return Err(MeshError::DegenerateElement {
                    element_id: t,
                    area,
                });
            }

            let centroid = (pa + pb + pc) / 3.0;
            for &v in tri {
                node_volumes[v] += area.abs() / 3.0;
            }

            for (p, q) in [(a, b), (b, c), (c, a)] {
                let key = (p.min(q), p.max(q));
                let e = *edge_index.entry(key).or_insert_with(|| {
                    edges.push(key);
                    face_vectors.push(DVec2::ZERO);
                    share_count.push(0);
                    edges.len() - 1
                });

                let (i, j) = key;
                let mid = 0.5 * (nodes[i] + nodes[j]);
                let d = centroid - mid;
                let mut normal = DVec2::new(d.y, -d.x);
                if normal.dot(nodes[j] - nodes[i]) < 0.0 {
                    normal = -normal;
                }
                face_vectors[e] += normal;
                share_count[e] += 1;
            }
        }

        let boundary_edges: Vec<bool> = share_count.iter().map(|&n| n == 1).collect();
        if let Some(e) = share_count.iter().position(|&n| n > 2) {
            return Err(MeshError::invalid_topology(
                "from_triangles",
                format!("边 {:?} 被 {} 个三角形共享", edges[e], share_count[e]),
            ));
        }

        debug!(
            nodes = n_nodes,
            triangles = triangles.len(),
            edges = edges.len(),
            boundary_edges = boundary_edges.iter().filter(|&&b| b).count(),
            "构建边网格"
        );

        Ok(Self {
            nodes,
            triangles,
            edges,
            face_vectors,
            boundary_edges,
            node_volumes,
        })
    }

    /// 直接由边列表和面向量构建（无三角形）
    ///
    /// 用于外部预处理生成的几何，或测试中构造任意面向量。
    pub fn from_edges(
        nodes: Vec<DVec2>,
        edges: Vec<(usize, usize)>,
        face_vectors: Vec<DVec2>,
    ) -> MeshResult<Self> {
        if face_vectors.len() != edges.len() {
            return Err(MeshError::SizeMismatch {
                name: "face_vectors",
                expected: edges.len(),
                actual: face_vectors.len(),
            });
        }
        let n_nodes = nodes.len();
        for (e, &(i, j)) in edges.iter().enumerate() {
            for v in [i, j] {
                if v >= n_nodes {
                    return Err(MeshError::node_out_of_range(format!("边 {}", e), v, n_nodes));
                }
            }
        }

        let n_edges = edges.len();
        Ok(Self {
            nodes,
            triangles: Vec::new(),
            edges,
            face_vectors,
            boundary_edges: vec![false; n_edges],
            node_volumes: vec![0.0; n_nodes],
        })
    }

    /// 节点坐标
    pub fn nodes(&self) -> &[DVec2] {
        &self.nodes
    }

    /// 三角形列表（`from_edges` 构建时为空）
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// 全部边
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// 边是否位于边界
    pub fn is_boundary_edge(&self, e: usize) -> bool {
        self.boundary_edges[e]
    }

    /// 节点对偶控制体面积
    pub fn node_volumes(&self) -> &[f64] {
        &self.node_volumes
    }

    /// 边界节点标记
    pub fn boundary_nodes(&self) -> Vec<bool> {
        let mut flags = vec![false; self.nodes.len()];
        for (e, &(i, j)) in self.edges.iter().enumerate() {
            if self.boundary_edges[e] {
                flags[i] = true;
                flags[j] = true;
            }
        }
        flags
    }

    /// 每个节点的关联边数
    pub fn node_degrees(&self) -> Vec<usize> {
        let mut deg = vec![0usize; self.nodes.len()];
        for &(i, j) in &self.edges {
            deg[i] += 1;
            deg[j] += 1;
        }
        deg
    }

    /// 计算域总面积
    pub fn total_volume(&self) -> f64 {
        self.node_volumes.iter().sum()
    }

    /// 检查几何与拓扑
    ///
    /// 错误: 端点越界、自环边、面向量为零或非有限、对偶体积非正或非有限。
    /// 警告: 内部节点的对偶控制体不闭合（面向量之和不为零）。
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let n_nodes = self.nodes.len();

        for (e, &(i, j)) in self.edges.iter().enumerate() {
            if i >= n_nodes || j >= n_nodes {
                report.add_error(ValidationError::TopologyError {
                    message: format!("端点 ({}, {}) 越界, 节点总数 {}", i, j, n_nodes),
                    element_id: Some(e),
                });
                continue;
            }
            if i == j {
                report.add_error(ValidationError::TopologyError {
                    message: format!("自环边, 节点 {}", i),
                    element_id: Some(e),
                });
            }
            let s = self.face_vectors[e];
            if check_finite(&mut report, "face_area", e, s.length()) && s.length() < MIN_AREA {
                report.add_error(ValidationError::TopologyError {
                    message: format!("对偶面面积为零: {:?}", s),
                    element_id: Some(e),
                });
            }
        }

        if !self.triangles.is_empty() {
            for (node, &vol) in self.node_volumes.iter().enumerate() {
                check_positive(&mut report, "vol", node, vol);
            }
        }

        if !self.triangles.is_empty() && !report.has_errors() {
            let mut closure = vec![DVec2::ZERO; n_nodes];
            let mut scale = vec![0.0f64; n_nodes];
            for (e, &(i, j)) in self.edges.iter().enumerate() {
                let s = self.face_vectors[e];
                closure[i] += s;
                closure[j] -= s;
                scale[i] += s.length();
                scale[j] += s.length();
            }
            let boundary = self.boundary_nodes();
            for node in 0..n_nodes {
                if boundary[node] || scale[node] == 0.0 {
                    continue;
                }
                let residual = closure[node].length() / scale[node];
                if residual > CLOSURE_TOLERANCE {
                    report.add_warning(ValidationWarning::QualityWarning {
                        message: format!("节点对偶控制体不闭合, 相对残差 {:.3e}", residual),
                        element_id: Some(node),
                    });
                }
            }
        }

        report
    }
}

impl GeometryProvider for EdgeMesh {
    #[inline]
    fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    fn n_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    fn edge_nodes(&self, e: usize) -> (usize, usize) {
        self.edges[e]
    }

    #[inline]
    fn face_vector(&self, e: usize) -> DVec2 {
        self.face_vectors[e]
    }
}
