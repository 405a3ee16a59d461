// crates/ef_physics/src/schemes/mod.rs

//! 数值格式模块
//!
//! 提供可压缩 Euler 方程的迎风耗散格式：
//! - 一阶 Roe 通量差分裂耗散
//! - 低马赫数预处理（Weiss–Smith）
//! - Harten 熵修正

pub mod roe;

// 重导出常用类型
pub use roe::{
    compute_dissipation, entropy_correction, matvec_prod5, CharacteristicState, EdgeContribution,
    PrecondEigenvalues, Preconditioner, RoeAverage, RoeDissipation,
};
