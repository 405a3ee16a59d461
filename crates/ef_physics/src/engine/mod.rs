// crates/ef_physics/src/engine/mod.rs

//! 引擎核心
//!
//! - [`accumulator`]: 节点耗散累加器（顺序与原子两种）
//! - [`parallel`]: 边循环的并行策略与性能指标

pub mod accumulator;
pub mod parallel;

pub use accumulator::{AtomicDissipationAccumulator, DissipationAccumulator};
pub use parallel::{DissipationCalculator, DissipationComputeMetrics};
