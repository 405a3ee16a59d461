// crates/ef_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于网格与场数据的预检查。
//!
//! # 示例
//!
//! ```
//! use ef_foundation::validation::{check_positive, ValidationReport};
//!
//! let volumes = [0.25, -1.0, f64::NAN];
//! let mut report = ValidationReport::new();
//! for (i, &v) in volumes.iter().enumerate() {
//!     check_positive(&mut report, "vol", i, v);
//! }
//! assert_eq!(report.error_count(), 2);
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 字段名称
        field: &'static str,
        /// 所在节点或边的编号
        index: usize,
        /// 非有限的数值
        value: f64,
    },
    /// 数据超出范围
    OutOfRange {
        /// 字段名称
        field: &'static str,
        /// 所在节点或边的编号
        index: usize,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
    /// 拓扑错误
    TopologyError {
        /// 错误描述
        message: String,
        /// 可选的元素 ID
        element_id: Option<usize>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                field,
                index,
                value,
            } => {
                write!(f, "#{}: 字段{}={} (非有限值)", index, field, value)
            }
            Self::OutOfRange {
                field,
                index,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "#{}: 字段{}={} 超出范围[{}, {}]",
                    index, field, value, min, max
                )
            }
            Self::TopologyError { message, element_id } => {
                if let Some(id) = element_id {
                    write!(f, "元素{}: 拓扑错误: {}", id, message)
                } else {
                    write!(f, "拓扑错误: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone)]
pub enum ValidationWarning {
    /// 质量警告
    QualityWarning {
        /// 警告描述
        message: String,
        /// 可选的元素 ID
        element_id: Option<usize>,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QualityWarning { message, element_id } => {
                if let Some(id) = element_id {
                    write!(f, "元素{}: 质量警告: {}", id, message)
                } else {
                    write!(f, "质量警告: {}", message)
                }
            }
        }
    }
}

// ============================================================================
// 验证辅助函数
// ============================================================================

/// 检查值是否有限
pub fn check_finite(
    report: &mut ValidationReport,
    field: &'static str,
    index: usize,
    value: f64,
) -> bool {
    if !value.is_finite() {
        report.add_error(ValidationError::NonFinite {
            field,
            index,
            value,
        });
        false
    } else {
        true
    }
}

/// 检查值是否严格为正
pub fn check_positive(
    report: &mut ValidationReport,
    field: &'static str,
    index: usize,
    value: f64,
) -> bool {
    if !check_finite(report, field, index, value) {
        return false;
    }
    if value <= 0.0 {
        report.add_error(ValidationError::OutOfRange {
            field,
            index,
            value,
            min: 0.0,
            max: f64::MAX,
        });
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_report_new() {
        let report = ValidationReport::new();
        assert!(!report.has_errors());
        assert!(!report.has_warnings());
        assert!(report.is_valid());
    }

    #[test]
    fn test_check_finite() {
        let mut report = ValidationReport::new();
        assert!(check_finite(&mut report, "face_area", 0, 0.5));
        assert!(!check_finite(&mut report, "face_area", 7, f64::INFINITY));
        assert_eq!(report.error_count(), 1);
        assert!(matches!(
            report.errors[0],
            ValidationError::NonFinite { field: "face_area", index: 7, .. }
        ));
    }

    #[test]
    fn test_check_positive() {
        let mut report = ValidationReport::new();
        assert!(check_positive(&mut report, "vol", 0, 1.0));
        assert!(!check_positive(&mut report, "vol", 1, 0.0));
        assert!(!check_positive(&mut report, "vol", 2, f64::NAN));
        assert_eq!(report.error_count(), 2);
        assert!(matches!(report.errors[0], ValidationError::OutOfRange { index: 1, .. }));
        assert!(matches!(report.errors[1], ValidationError::NonFinite { index: 2, .. }));
    }

    #[test]
    fn test_display() {
        let mut report = ValidationReport::new();
        report.add_warning(ValidationWarning::QualityWarning {
            message: "对偶控制体不闭合".into(),
            element_id: Some(3),
        });
        check_positive(&mut report, "vol", 4, -2.0);
        let text = report.to_string();
        assert!(text.contains("vol"));
        assert!(text.contains("元素3"));
    }
}
