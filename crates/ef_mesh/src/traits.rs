// crates/ef_mesh/src/traits.rs

//! 边几何只读访问接口
//!
//! 耗散核心只通过此 trait 读取几何，不依赖具体网格实现。
//!
//! # 约定
//!
//! - 边 `e` 的端点为有序对 `(i, j)`，面向量从 i 指向 j
//! - 面向量 = 单位法向 × 面长，长度即对偶面面积
//! - 实现必须 `Send + Sync`，以便在 rayon 并行迭代器中共享

use glam::DVec2;

/// 边几何提供者
pub trait GeometryProvider: Send + Sync {
    /// 节点总数
    fn n_nodes(&self) -> usize;

    /// 边总数
    fn n_edges(&self) -> usize;

    /// 边 `e` 的有序端点 `(i, j)`
    fn edge_nodes(&self, e: usize) -> (usize, usize);

    /// 边 `e` 的面向量（从 i 指向 j）
    fn face_vector(&self, e: usize) -> DVec2;

    /// 对偶面面积
    #[inline]
    fn face_area(&self, e: usize) -> f64 {
        self.face_vector(e).length()
    }
}
