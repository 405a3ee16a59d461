// crates/ef_foundation/src/kahan.rs

//! Kahan 求和算法

/// Kahan 补偿求和
///
/// 守恒检查要对全网格求和，普通累加的舍入误差会随节点数增长，
/// 这里用补偿项把误差压到与单次加法同量级。
///
/// # 示例
///
/// ```rust
/// use ef_foundation::KahanSum;
///
/// let sum = KahanSum::sum_iter(vec![0.1; 10]);
/// assert!((sum - 1.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    /// 创建新的求和器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    /// 重置求和器
    #[inline]
    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.compensation = 0.0;
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = f64>>(iter: I) -> f64 {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}
