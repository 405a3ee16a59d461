// crates/ef_mesh/src/generation.rs

//! 网格生成模块
//!
//! 提供矩形域三角网格生成器，用于测试、算例和命令行运行。
//!
//! # 使用示例
//!
//! ```rust
//! use ef_mesh::generation::RectMeshGenerator;
//!
//! let generator = RectMeshGenerator::new(10, 10, 100.0, 100.0);
//! let mesh = generator.build().unwrap();
//!
//! assert_eq!(mesh.triangles().len(), 200); // 10*10*2 triangles
//! ```

use glam::DVec2;

use crate::edge_mesh::EdgeMesh;
use crate::error::MeshResult;

/// 矩形结构化网格生成器
///
/// 生成矩形域上的三角形网格，顶点按行主序排列
#[derive(Debug, Clone, Copy)]
pub struct RectMeshGenerator {
    /// x 方向单元数
    nx: usize,
    /// y 方向单元数
    ny: usize,
    /// x 方向域长度 [m]
    lx: f64,
    /// y 方向域长度 [m]
    ly: f64,
    /// 原点
    origin: DVec2,
}

impl RectMeshGenerator {
    /// 创建矩形网格生成器
    ///
    /// # 参数
    ///
    /// - `nx`: x 方向单元数
    /// - `ny`: y 方向单元数
    /// - `lx`: x 方向域长度
    /// - `ly`: y 方向域长度
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        Self {
            nx,
            ny,
            lx,
            ly,
            origin: DVec2::ZERO,
        }
    }

    /// 创建方形网格生成器
    pub fn square(n: usize, length: f64) -> Self {
        Self::new(n, n, length, length)
    }

    /// 设置原点偏移
    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.origin = DVec2::new(x0, y0);
        self
    }

    /// 获取 x 方向网格间距
    pub fn dx(&self) -> f64 {
        self.lx / self.nx as f64
    }

    /// 获取 y 方向网格间距
    pub fn dy(&self) -> f64 {
        self.ly / self.ny as f64
    }

    /// 获取顶点总数
    pub fn n_vertices(&self) -> usize {
        (self.nx + 1) * (self.ny + 1)
    }

    /// 获取单元总数（每个矩形分为 2 个三角形）
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny * 2
    }

    /// 获取边总数
    pub fn n_edges(&self) -> usize {
        (self.nx + 1) * self.ny + self.nx * (self.ny + 1) + self.nx * self.ny
    }

    /// 构建边网格
    pub fn build(&self) -> MeshResult<EdgeMesh> {
        let dx = self.dx();
        let dy = self.dy();

        let mut nodes = Vec::with_capacity(self.n_vertices());
        for j in 0..=self.ny {
            for i in 0..=self.nx {
                nodes.push(self.origin + DVec2::new(i as f64 * dx, j as f64 * dy));
            }
        }

        let vertex_idx = |i: usize, j: usize| -> usize { j * (self.nx + 1) + i };

        let mut triangles = Vec::with_capacity(self.n_cells());
        for j in 0..self.ny {
            for i in 0..self.nx {
                let v00 = vertex_idx(i, j);
                let v10 = vertex_idx(i + 1, j);
                let v01 = vertex_idx(i, j + 1);
                let v11 = vertex_idx(i + 1, j + 1);

                // 交替对角线方向，避免各向异性
                if (i + j) % 2 == 0 {
                    triangles.push([v00, v10, v11]);
                    triangles.push([v00, v11, v01]);
                } else {
                    triangles.push([v00, v10, v01]);
                    triangles.push([v10, v11, v01]);
                }
            }
        }

        EdgeMesh::from_triangles(nodes, triangles)
    }
}
