// crates/ef_physics/src/engine/accumulator.rs

//! 耗散累加器模块
//!
//! 把边上计算的耗散通量累加到节点上。
//!
//! # 设计
//!
//! - `DissipationAccumulator` - 普通累加器，顺序、着色、私有归约策略使用
//! - `AtomicDissipationAccumulator` - 原子操作累加器，多个线程可同时写同一节点
//!
//! 每个节点四个分量 (dens, xmom, ymom, ener)；z 动量在二维中恒为零，不存储。

use std::sync::atomic::{AtomicU64, Ordering};

use ef_foundation::error::{EfError, EfResult};
use ef_foundation::float::first_non_finite;
use ef_foundation::KahanSum;
use tracing::warn;

use crate::state::ConservativeVars;

/// 节点耗散累加器
#[derive(Debug, Clone)]
pub struct DissipationAccumulator {
    n_nodes: usize,
    /// 质量耗散
    pub dens: Vec<f64>,
    /// x 动量耗散
    pub xmom: Vec<f64>,
    /// y 动量耗散
    pub ymom: Vec<f64>,
    /// 能量耗散
    pub ener: Vec<f64>,
}

impl DissipationAccumulator {
    /// 创建清零的累加器
    ///
    /// # 参数
    /// - `n_nodes`: 节点数量
    pub fn new(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            dens: vec![0.0; n_nodes],
            xmom: vec![0.0; n_nodes],
            ymom: vec![0.0; n_nodes],
            ener: vec![0.0; n_nodes],
        }
    }

    /// 重置所有累加值为零
    pub fn reset(&mut self) {
        self.dens.fill(0.0);
        self.xmom.fill(0.0);
        self.ymom.fill(0.0);
        self.ener.fill(0.0);
    }

    /// 获取节点数量
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// 节点 `i` 的累加值
    #[inline]
    pub fn get(&self, i: usize) -> ConservativeVars {
        ConservativeVars::new(self.dens[i], self.xmom[i], self.ymom[i], self.ener[i])
    }

    /// 加到节点 `i`
    #[inline]
    pub fn add(&mut self, i: usize, flux: &ConservativeVars) {
        self.dens[i] += flux.dens;
        self.xmom[i] += flux.xmom;
        self.ymom[i] += flux.ymom;
        self.ener[i] += flux.ener;
    }

    /// 从节点 `i` 减去
    #[inline]
    pub fn sub(&mut self, i: usize, flux: &ConservativeVars) {
        self.dens[i] -= flux.dens;
        self.xmom[i] -= flux.xmom;
        self.ymom[i] -= flux.ymom;
        self.ener[i] -= flux.ener;
    }

    /// 边贡献散射：+flux 到 i，-flux 到 j
    #[inline]
    pub fn scatter(&mut self, i: usize, j: usize, flux: &ConservativeVars) {
        self.add(i, flux);
        self.sub(j, flux);
    }

    /// 合并另一个累加器（逐节点相加）
    pub fn merge(&mut self, other: &DissipationAccumulator) {
        for (a, b) in self.dens.iter_mut().zip(&other.dens) {
            *a += b;
        }
        for (a, b) in self.xmom.iter_mut().zip(&other.xmom) {
            *a += b;
        }
        for (a, b) in self.ymom.iter_mut().zip(&other.ymom) {
            *a += b;
        }
        for (a, b) in self.ener.iter_mut().zip(&other.ener) {
            *a += b;
        }
    }

    /// 各分量的全场总和（Kahan 求和）
    ///
    /// 每条边对两端贡献相反，总和应在舍入误差内为零。
    pub fn total(&self) -> ConservativeVars {
        ConservativeVars::new(
            KahanSum::sum_iter(self.dens.iter().copied()),
            KahanSum::sum_iter(self.xmom.iter().copied()),
            KahanSum::sum_iter(self.ymom.iter().copied()),
            KahanSum::sum_iter(self.ener.iter().copied()),
        )
    }

    /// 全部分量的最大绝对值
    pub fn max_abs(&self) -> f64 {
        self.dens
            .iter()
            .chain(&self.xmom)
            .chain(&self.ymom)
            .chain(&self.ener)
            .fold(0.0f64, |m, x| m.max(x.abs()))
    }

    /// 检查是否出现非有限值
    ///
    /// 遍历中不拦截 NaN/Inf；一次遍历结束后由调用方调用本方法。
    pub fn check_finite(&self) -> EfResult<()> {
        for (field, values) in [
            ("dens", &self.dens),
            ("xmom", &self.xmom),
            ("ymom", &self.ymom),
            ("ener", &self.ener),
        ] {
            if let Some((index, value)) = first_non_finite(values) {
                warn!(field, index, value, "耗散中出现非有限值");
                return Err(EfError::numerical_breakdown(field, index, value));
            }
        }
        Ok(())
    }
}

/// 原子操作耗散累加器
///
/// 使用 compare-exchange 循环实现 f64 原子加法，
/// 不同线程可同时向同一节点累加。结果与加法顺序有关，只在舍入误差内确定。
pub struct AtomicDissipationAccumulator {
    n_nodes: usize,
    dens: Vec<AtomicU64>,
    xmom: Vec<AtomicU64>,
    ymom: Vec<AtomicU64>,
    ener: Vec<AtomicU64>,
}

impl AtomicDissipationAccumulator {
    /// 创建清零的原子累加器
    pub fn new(n_nodes: usize) -> Self {
        let zeros = || (0..n_nodes).map(|_| AtomicU64::new(0.0f64.to_bits())).collect();
        Self {
            n_nodes,
            dens: zeros(),
            xmom: zeros(),
            ymom: zeros(),
            ener: zeros(),
        }
    }

    /// 获取节点数量
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// 原子加法操作
    #[inline]
    fn atomic_add(atomic: &AtomicU64, val: f64) {
        let mut old = atomic.load(Ordering::Relaxed);
        loop {
            let new = (f64::from_bits(old) + val).to_bits();
            match atomic.compare_exchange_weak(old, new, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(x) => old = x,
            }
        }
    }

    /// 以符号 `sign` 累加到节点 `i`（线程安全）
    #[inline]
    fn accumulate(&self, i: usize, flux: &ConservativeVars, sign: f64) {
        Self::atomic_add(&self.dens[i], sign * flux.dens);
        Self::atomic_add(&self.xmom[i], sign * flux.xmom);
        Self::atomic_add(&self.ymom[i], sign * flux.ymom);
        Self::atomic_add(&self.ener[i], sign * flux.ener);
    }

    /// 边贡献散射（线程安全）
    #[inline]
    pub fn scatter(&self, i: usize, j: usize, flux: &ConservativeVars) {
        self.accumulate(i, flux, 1.0);
        self.accumulate(j, flux, -1.0);
    }

    /// 把累加结果加到普通累加器
    pub fn add_into(&self, acc: &mut DissipationAccumulator) {
        let load = |a: &AtomicU64| f64::from_bits(a.load(Ordering::Relaxed));
        for i in 0..self.n_nodes.min(acc.n_nodes()) {
            acc.dens[i] += load(&self.dens[i]);
            acc.xmom[i] += load(&self.xmom[i]);
            acc.ymom[i] += load(&self.ymom[i]);
            acc.ener[i] += load(&self.ener[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_accumulator_new() {
        let acc = DissipationAccumulator::new(10);
        assert_eq!(acc.n_nodes(), 10);
        assert!(acc.max_abs() == 0.0);
    }

    #[test]
    fn test_scatter_conserves() {
        let mut acc = DissipationAccumulator::new(3);
        let f = ConservativeVars::new(1.0, -2.0, 0.5, 3.0);
        acc.scatter(0, 1, &f);
        acc.scatter(1, 2, &f);

        assert!((acc.dens[0] - 1.0).abs() < 1e-15);
        assert!(acc.dens[1].abs() < 1e-15);
        assert!((acc.dens[2] + 1.0).abs() < 1e-15);

        let total = acc.total();
        assert!(total.dens.abs() < 1e-15);
        assert!(total.ener.abs() < 1e-15);
    }

    #[test]
    fn test_reset_and_merge() {
        let mut a = DissipationAccumulator::new(2);
        let mut b = DissipationAccumulator::new(2);
        a.add(0, &ConservativeVars::new(1.0, 1.0, 1.0, 1.0));
        b.add(0, &ConservativeVars::new(2.0, 0.0, 0.0, 0.0));
        a.merge(&b);
        assert!((a.dens[0] - 3.0).abs() < 1e-15);

        a.reset();
        assert!(a.max_abs() == 0.0);
    }

    #[test]
    fn test_check_finite() {
        let mut acc = DissipationAccumulator::new(4);
        assert!(acc.check_finite().is_ok());

        acc.ymom[2] = f64::NAN;
        let err = acc.check_finite().unwrap_err();
        assert!(err.is_numerical_breakdown());
        assert!(matches!(
            err,
            EfError::NumericalBreakdown { field: "ymom", index: 2, .. }
        ));
    }

    #[test]
    fn test_atomic_parallel_scatter() {
        let n = 16;
        let atomic = AtomicDissipationAccumulator::new(n);
        (0..1000usize).into_par_iter().for_each(|k| {
            let i = k % n;
            let j = (k + 1) % n;
            atomic.scatter(i, j, &ConservativeVars::new(1.0, 0.0, 0.0, 0.5));
        });

        let mut acc = DissipationAccumulator::new(n);
        atomic.add_into(&mut acc);
        let total = acc.total();
        assert!(total.dens.abs() < 1e-12);
        assert!(total.ener.abs() < 1e-12);
        // 节点 0 作为起点 63 次（k ≡ 0），作为终点 62 次（k ≡ 15）
        assert!((acc.dens[0] - 1.0).abs() < 1e-12);
    }
}
