// crates/ef_physics/src/traits.rs

//! 状态访问抽象
//!
//! 耗散核心通过 [`FluidStateProvider`] 读取节点状态，通过
//! [`GeometryProvider`] 读取边几何。两者在一次遍历期间只读共享。

pub use ef_mesh::GeometryProvider;

use crate::state::{ConservativeVars, DependentVars};

/// 节点流动状态提供者
///
/// 守恒变量与依赖变量必须来自同一时刻的快照。
pub trait FluidStateProvider: Send + Sync {
    /// 节点总数
    fn n_nodes(&self) -> usize;

    /// 节点 `i` 的守恒变量
    fn conservative(&self, i: usize) -> ConservativeVars;

    /// 节点 `i` 的依赖变量
    fn dependent(&self, i: usize) -> DependentVars;
}
