// crates/ef_foundation/src/lib.rs

//! EdgeFlow Foundation Layer
//!
//! 基础层，提供整个工作区共用的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `EfError`
//! - [`float`]: 数值常量与有限性检查
//! - [`kahan`]: Kahan 补偿求和（守恒量统计）
//! - [`validation`]: 运行时验证报告
//!
//! # 设计原则
//!
//! 1. **最少依赖**: 仅依赖 thiserror
//! 2. **不吞错误**: 数值异常以错误值上报，由调用方决定如何中止
//!
//! # 示例
//!
//! ```
//! use ef_foundation::{EfError, EfResult, float::first_non_finite};
//!
//! fn check(values: &[f64]) -> EfResult<()> {
//!     if let Some((index, value)) = first_non_finite(values) {
//!         return Err(EfError::numerical_breakdown("dens", index, value));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(&[1.0, 2.0]).is_ok());
//! assert!(check(&[1.0, f64::NAN]).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;
pub mod kahan;
pub mod validation;

// 重导出常用类型
pub use error::{EfError, EfResult};
pub use kahan::KahanSum;
pub use validation::{ValidationError, ValidationReport, ValidationWarning};
