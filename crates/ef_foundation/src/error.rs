// crates/ef_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `EfError` 枚举和 `EfResult` 类型别名，用于整个工作区的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，配置与网格错误在各自 crate 中定义后转换
//! 2. **易用性**: 提供便捷的构造方法
//! 3. **不在热循环中抛错**: 数值崩溃由调用方在整个遍历结束后检测
//!
//! # 示例
//!
//! ```
//! use ef_foundation::error::{EfError, EfResult};
//!
//! fn read_config() -> EfResult<()> {
//!     Err(EfError::config("配置文件格式错误"))
//! }
//! assert!(read_config().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type EfResult<T> = Result<T, EfError>;

/// EdgeFlow 错误类型
#[derive(Error, Debug)]
pub enum EfError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    // ========================================================================
    // 输入数据错误
    // ========================================================================
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    /// 无效网格拓扑或几何
    #[error("无效的网格: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 配置错误
    // ========================================================================
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    // ========================================================================
    // 数值错误
    // ========================================================================
    /// 数值崩溃（NaN/Inf 出现在场变量或耗散中）
    #[error("数值崩溃: 字段{field} 在节点{index}处出现非有限值 {value}")]
    NumericalBreakdown {
        /// 字段名
        field: &'static str,
        /// 首个非有限值所在节点
        index: usize,
        /// 非有限值
        value: f64,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl EfError {
    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 数值崩溃
    pub fn numerical_breakdown(field: &'static str, index: usize, value: f64) -> Self {
        Self::NumericalBreakdown {
            field,
            index,
            value,
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 是否为数值崩溃
    ///
    /// 时间推进驱动据此决定放弃当前迭代。
    pub fn is_numerical_breakdown(&self) -> bool {
        matches!(self, Self::NumericalBreakdown { .. })
    }

    /// 是否为配置类错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidConfig { .. })
    }
}

impl From<std::io::Error> for EfError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EfError::size_mismatch("dens", 10, 8);
        let msg = err.to_string();
        assert!(msg.contains("dens"));
        assert!(msg.contains("10"));
        assert!(msg.contains("8"));
    }

    #[test]
    fn test_numerical_breakdown() {
        let err = EfError::numerical_breakdown("ener", 42, f64::NAN);
        assert!(err.is_numerical_breakdown());
        assert!(!err.is_config_error());
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_config_errors() {
        assert!(EfError::config("x").is_config_error());
        assert!(EfError::invalid_config("blend", "1.5", "超出[0, 1]").is_config_error());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EfError = io.into();
        assert!(matches!(err, EfError::Io { source: Some(_), .. }));
    }

    #[test]
    fn test_io_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = EfError::io_with_source("无法写入 out.vtk", io);
        assert!(err.to_string().contains("out.vtk"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
