// crates/ef_foundation/src/float.rs

//! 数值常量和有限性检查
//!
//! 热循环内部不做任何 NaN 防护；这里的工具函数供调用方在一次完整
//! 遍历结束后检查结果数组。

use std::fmt;

// ============================================================================
// 数值常量
// ============================================================================

/// 浮点数相等性比较的默认容差
pub const DEFAULT_EPSILON: f64 = 1e-14;

/// 收敛历史中残差比值的下限（避免 log10(0)）
pub const MIN_RESIDUAL_RATIO: f64 = 1.0e-33;

/// 最小允许面积 (m²)
pub const MIN_AREA: f64 = 1e-12;

// ============================================================================
// 非有限值错误
// ============================================================================

/// 非有限值错误
#[derive(Debug, Clone)]
pub struct NonFiniteError {
    /// 非法的浮点值（NaN 或 Inf）
    pub value: f64,
}

impl fmt::Display for NonFiniteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_nan() {
            write!(f, "值为 NaN")
        } else if self.value.is_infinite() {
            write!(f, "值为无穷大: {}", self.value)
        } else {
            write!(f, "非有限浮点值: {}", self.value)
        }
    }
}

impl std::error::Error for NonFiniteError {}

/// 检查单个值
#[inline]
pub fn ensure_finite(value: f64) -> Result<f64, NonFiniteError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NonFiniteError { value })
    }
}

/// 查找第一个非有限值
///
/// # 返回
/// `Some((索引, 值))`，全部有限时返回 `None`
pub fn first_non_finite(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
}

/// 相对/绝对混合容差比较
#[inline]
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tol * scale
}
