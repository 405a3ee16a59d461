// crates/ef_physics/src/schemes/roe/entropy.rs

//! Harten 熵修正

/// 熵修正后的特征值幅值
///
/// `|λ| >= δ` 时返回 `|λ|`，否则返回抛物线 `(λ² + δ²) / (2δ)`。
/// 两段在 `|λ| = δ` 处连续，结果恒为非负。
///
/// # 参数
/// - `lambda`: 带符号的特征值
/// - `delta`: 修正阈值，必须为正（由配置验证保证）
#[inline]
pub fn entropy_correction(lambda: f64, delta: f64) -> f64 {
    let z = lambda.abs();
    if z >= delta {
        z
    } else {
        0.5 * (z * z + delta * delta) / delta
    }
}
