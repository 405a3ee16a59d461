// crates/ef_physics/src/convergence.rs

//! 收敛监测
//!
//! 以密度变化衡量迭代收敛：
//!
//! ```text
//! drho  = sqrt(Σ (ρ_new - ρ_old)²) / n
//! drmax = max |ρ_new - ρ_old|
//! ```
//!
//! 第一次记录的 drho 作为参考值，之后报告相对参考值的比值及其 log10。

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ef_foundation::error::{EfError, EfResult};
use ef_foundation::float::MIN_RESIDUAL_RATIO;

use crate::state::FlowState;

/// 单次迭代的收敛记录
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceRecord {
    /// 迭代序号
    pub iter: usize,
    /// 相对密度变化
    pub drho: f64,
    /// log10(drho)
    pub log10_drho: f64,
    /// 最大绝对密度变化
    pub drmax: f64,
    /// 最大变化所在节点
    pub idrmax: usize,
}

/// 收敛监测器
#[derive(Debug, Clone, Default)]
pub struct ConvergenceMonitor {
    reference: Option<f64>,
    history: Vec<ConvergenceRecord>,
}

impl ConvergenceMonitor {
    /// 创建监测器
    pub fn new() -> Self {
        Self::default()
    }

    /// 参考值（第一次记录后可用）
    pub fn reference(&self) -> Option<f64> {
        self.reference
    }

    /// 全部历史记录
    pub fn history(&self) -> &[ConvergenceRecord] {
        &self.history
    }

    /// 最近一次记录
    pub fn last(&self) -> Option<&ConvergenceRecord> {
        self.history.last()
    }

    /// 清空参考值和历史
    pub fn reset(&mut self) {
        self.reference = None;
        self.history.clear();
    }

    /// 记录一次迭代
    ///
    /// # 参数
    /// - `iter`: 迭代序号
    /// - `old`: 上一步守恒变量
    /// - `new`: 当前守恒变量
    ///
    /// # 返回
    /// 本次的收敛记录；密度变化出现 NaN/Inf 时返回数值崩溃错误
    pub fn record(&mut self, iter: usize, old: &FlowState, new: &FlowState) -> EfResult<ConvergenceRecord> {
        let n = new.n_nodes();
        if old.n_nodes() != n {
            return Err(EfError::size_mismatch("old_state", n, old.n_nodes()));
        }
        if n == 0 {
            return Err(EfError::invalid_input("收敛监测需要至少一个节点"));
        }

        let mut sum = 0.0;
        let mut drmax = 0.0;
        let mut idrmax = 0;
        for (i, (rn, ro)) in new.dens.iter().zip(&old.dens).enumerate() {
            let dr = rn - ro;
            sum += dr * dr;
            if dr.abs() > drmax {
                drmax = dr.abs();
                idrmax = i;
            }
        }

        let norm = sum.sqrt() / n as f64;
        if !norm.is_finite() {
            warn!(iter, "密度变化出现非有限值");
            let (index, value) = new
                .dens
                .iter()
                .zip(&old.dens)
                .map(|(a, b)| a - b)
                .enumerate()
                .find(|(_, d)| !d.is_finite())
                .unwrap_or((0, norm));
            return Err(EfError::numerical_breakdown("dens", index, value));
        }

        let drho = match self.reference {
            None => {
                self.reference = Some(norm.max(MIN_RESIDUAL_RATIO));
                1.0
            }
            Some(reference) => (norm / reference).max(MIN_RESIDUAL_RATIO),
        };

        let record = ConvergenceRecord {
            iter,
            drho,
            log10_drho: drho.log10(),
            drmax,
            idrmax,
        };
        info!(
            iter,
            log10_drho = record.log10_drho,
            drmax,
            idrmax,
            "收敛历史"
        );
        self.history.push(record);
        Ok(record)
    }

    /// 历史记录序列化为 JSON
    pub fn to_json(&self) -> EfResult<String> {
        serde_json::to_string_pretty(&self.history).map_err(|e| EfError::serialization(e.to_string()))
    }

    /// 历史记录保存到文件
    pub fn save_history<P: AsRef<Path>>(&self, path: P) -> EfResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| EfError::io_with_source(format!("无法写入收敛历史: {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(dens: &[f64]) -> FlowState {
        let mut s = FlowState::new(dens.len());
        s.dens.copy_from_slice(dens);
        s
    }

    #[test]
    fn test_first_record_is_reference() {
        let mut monitor = ConvergenceMonitor::new();
        let rec = monitor
            .record(1, &state(&[1.0, 1.0]), &state(&[1.3, 0.6]))
            .unwrap();
        assert!((rec.drho - 1.0).abs() < 1e-15);
        assert!(rec.log10_drho.abs() < 1e-15);
        assert!((rec.drmax - 0.4).abs() < 1e-12);
        assert_eq!(rec.idrmax, 1);
        // sqrt(0.09 + 0.16) / 2
        assert!((monitor.reference().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_and_log() {
        let mut monitor = ConvergenceMonitor::new();
        monitor.record(1, &state(&[1.0]), &state(&[1.1])).unwrap();
        let rec = monitor.record(2, &state(&[1.0]), &state(&[1.001])).unwrap();
        assert!((rec.drho - 0.01).abs() < 1e-9);
        assert!((rec.log10_drho + 2.0).abs() < 1e-6);
        assert_eq!(monitor.history().len(), 2);
    }

    #[test]
    fn test_floor_on_zero_change() {
        let mut monitor = ConvergenceMonitor::new();
        let s = state(&[1.0, 2.0]);
        monitor.record(1, &s, &s).unwrap();
        assert!((monitor.reference().unwrap() - MIN_RESIDUAL_RATIO).abs() < 1e-40);
        let rec = monitor.record(2, &s, &s).unwrap();
        assert!((rec.drho - MIN_RESIDUAL_RATIO).abs() < 1e-40);
        assert!((rec.log10_drho + 33.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_is_breakdown() {
        let mut monitor = ConvergenceMonitor::new();
        let err = monitor
            .record(1, &state(&[1.0, 1.0]), &state(&[1.0, f64::NAN]))
            .unwrap_err();
        assert!(matches!(err, EfError::NumericalBreakdown { index: 1, .. }));
        assert!(monitor.history().is_empty());
    }

    #[test]
    fn test_history_json() {
        let mut monitor = ConvergenceMonitor::new();
        monitor.record(1, &state(&[1.0]), &state(&[1.5])).unwrap();
        let json = monitor.to_json().unwrap();
        let parsed: Vec<ConvergenceRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].iter, 1);
    }

    #[test]
    fn test_save_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut monitor = ConvergenceMonitor::new();
        monitor.record(1, &state(&[1.0]), &state(&[1.2])).unwrap();
        monitor.save_history(&path).unwrap();
        assert!(path.exists());
    }
}
