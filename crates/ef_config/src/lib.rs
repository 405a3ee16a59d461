// crates/ef_config/src/lib.rs

//! EdgeFlow Config Layer
//!
//! 配置层，提供求解器配置的定义、JSON 加载和加载期验证。
//!
//! # 模块概览
//!
//! - [`solver_config`]: SolverConfig 求解器配置（全 f64）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! ef_cli      ─> SolverConfig::from_file
//! ef_physics  ─> DissipationConfig, GasConfig, ParallelConfig
//! ef_config   ─> 本层
//! ef_foundation
//! ```
//!
//! # 设计原则
//!
//! 1. **加载即验证**: 所有参数检查在 `validate` 中完成，热循环不再检查
//! 2. **全部可缺省**: 每个字段都有 `default_*` 默认值，空 JSON 对象即为合法配置

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod solver_config;

// 重导出核心类型
pub use error::ConfigError;
pub use solver_config::{
    DissipationConfig, FreestreamConfig, GasConfig, MeshConfig, OutputConfig, OutputField,
    ParallelConfig, ParallelStrategy, PreconditioningConfig, SolverConfig,
};
