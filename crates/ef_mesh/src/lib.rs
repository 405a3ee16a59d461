// crates/ef_mesh/src/lib.rs

//! EdgeFlow 网格模块
//!
//! 为边基有限体积格式提供几何数据：每条边的两个端点和中线对偶控制体
//! 的面向量（法向 × 面长）。
//!
//! # 核心类型
//!
//! - [`EdgeMesh`]: 由三角形构建的边网格
//! - [`GeometryProvider`]: 耗散核心访问几何的只读接口
//! - [`RectMeshGenerator`]: 矩形域三角网格生成器
//! - [`EdgeColoring`]: 无公共节点的边着色，供并行散射使用
//!
//! # 示例
//!
//! ```rust
//! use ef_mesh::{GeometryProvider, RectMeshGenerator};
//!
//! let mesh = RectMeshGenerator::new(2, 2, 1.0, 1.0).build().unwrap();
//! assert_eq!(mesh.n_nodes(), 9);
//! assert_eq!(mesh.n_edges(), 16);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coloring;
pub mod edge_mesh;
pub mod error;
pub mod generation;
pub mod traits;

pub use coloring::{ColoringResult, EdgeColoring};
pub use edge_mesh::EdgeMesh;
pub use error::{MeshError, MeshResult};
pub use generation::RectMeshGenerator;
pub use traits::GeometryProvider;
