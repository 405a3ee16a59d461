// crates/ef_physics/src/engine/parallel.rs

//! 并行耗散计算模块
//!
//! 边循环的多种执行策略：
//! - 串行（小规模问题）
//! - 边着色：同色边无公共节点，色内并行计算后散射，结果确定
//! - 私有归约：每个工作线程一份私有累加器，最后合并
//! - 原子累加：直接用原子加法散射到共享节点
//!
//! 所有策略在舍入误差内给出相同结果；只有串行和着色策略逐位可复现。

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::debug;

use ef_config::{DissipationConfig, ParallelConfig, ParallelStrategy};
use ef_foundation::error::EfResult;
use ef_mesh::{ColoringResult, EdgeColoring};

use crate::engine::accumulator::{AtomicDissipationAccumulator, DissipationAccumulator};
use crate::schemes::roe::check_sizes;
use crate::schemes::RoeDissipation;
use crate::traits::{FluidStateProvider, GeometryProvider};

/// 私有归约中每个任务至少处理的边数
const MIN_EDGES_PER_TASK: usize = 512;

// ============================================================
// 性能指标
// ============================================================

/// 耗散计算性能指标
#[derive(Debug, Clone, Default)]
pub struct DissipationComputeMetrics {
    /// 总计算次数
    pub total_calls: usize,
    /// 并行计算次数
    pub parallel_calls: usize,
    /// 串行计算次数
    pub sequential_calls: usize,
    /// 总计算时间
    pub total_duration: Duration,
    /// 处理的边总数
    pub total_edges: usize,
}

impl DissipationComputeMetrics {
    /// 记录一次计算
    pub fn record(&mut self, n_edges: usize, is_parallel: bool, duration: Duration) {
        self.total_calls += 1;
        self.total_edges += n_edges;
        self.total_duration += duration;
        if is_parallel {
            self.parallel_calls += 1;
        } else {
            self.sequential_calls += 1;
        }
    }

    /// 重置指标
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 平均每条边计算时间
    pub fn avg_time_per_edge(&self) -> Duration {
        if self.total_edges > 0 {
            self.total_duration / self.total_edges as u32
        } else {
            Duration::ZERO
        }
    }
}

// ============================================================
// 并行耗散计算器
// ============================================================

/// 并行耗散计算器
///
/// 封装耗散核、并行配置和（可选的）边着色。
pub struct DissipationCalculator {
    kernel: RoeDissipation,
    config: ParallelConfig,
    coloring: Option<ColoringResult>,
    metrics: DissipationComputeMetrics,
}

impl DissipationCalculator {
    /// 创建计算器
    pub fn new(kernel: RoeDissipation, config: ParallelConfig) -> Self {
        Self {
            kernel,
            config,
            coloring: None,
            metrics: DissipationComputeMetrics::default(),
        }
    }

    /// 由耗散配置和并行配置创建
    pub fn from_config(dissipation: &DissipationConfig, parallel: &ParallelConfig) -> EfResult<Self> {
        Ok(Self::new(RoeDissipation::new(dissipation)?, *parallel))
    }

    /// 为网格计算边着色
    pub fn setup_coloring<G: GeometryProvider + ?Sized>(&mut self, geometry: &G) {
        let coloring = EdgeColoring::color(geometry);
        debug!(
            num_colors = coloring.num_colors,
            balance = coloring.balance_factor(),
            "边着色完成"
        );
        self.coloring = Some(coloring);
    }

    /// 是否已有边着色
    pub fn has_coloring(&self) -> bool {
        self.coloring.is_some()
    }

    /// 颜色数量
    pub fn num_colors(&self) -> usize {
        self.coloring.as_ref().map_or(0, |c| c.num_colors)
    }

    /// 当前着色
    pub fn coloring(&self) -> Option<&ColoringResult> {
        self.coloring.as_ref()
    }

    /// 耗散核
    pub fn kernel(&self) -> &RoeDissipation {
        &self.kernel
    }

    /// 并行配置
    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// 性能指标
    pub fn metrics(&self) -> &DissipationComputeMetrics {
        &self.metrics
    }

    /// 重置性能指标
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// 按配置解析实际使用的策略
    pub fn resolve_strategy(&self, n_edges: usize) -> ParallelStrategy {
        match self.config.strategy {
            ParallelStrategy::Auto => {
                if n_edges < self.config.min_parallel_size {
                    ParallelStrategy::Sequential
                } else if self.has_coloring() {
                    ParallelStrategy::Colored
                } else {
                    ParallelStrategy::PrivateReduce
                }
            }
            other => other,
        }
    }

    /// 一次完整的耗散遍历
    ///
    /// 把全部边的贡献加到 `acc`（不清零）。
    pub fn compute<G, S>(&mut self, geometry: &G, state: &S, acc: &mut DissipationAccumulator) -> EfResult<()>
    where
        G: GeometryProvider + ?Sized,
        S: FluidStateProvider + ?Sized,
    {
        check_sizes(geometry, state, acc)?;

        let n_edges = geometry.n_edges();
        let strategy = self.resolve_strategy(n_edges);
        let start = Instant::now();

        match strategy {
            ParallelStrategy::Sequential | ParallelStrategy::Auto => {
                self.kernel.accumulate(geometry, state, acc);
            }
            ParallelStrategy::Colored => {
                let stale = self
                    .coloring
                    .as_ref()
                    .map_or(true, |c| c.edge_colors.len() != n_edges);
                if stale {
                    self.setup_coloring(geometry);
                }
                self.compute_colored(geometry, state, acc);
            }
            ParallelStrategy::PrivateReduce => self.compute_private_reduce(geometry, state, acc),
            ParallelStrategy::Atomic => self.compute_atomic(geometry, state, acc),
        }

        let duration = start.elapsed();
        let is_parallel = strategy != ParallelStrategy::Sequential;
        self.metrics.record(n_edges, is_parallel, duration);
        debug!(
            strategy = strategy.name(),
            n_edges,
            elapsed_us = duration.as_micros() as u64,
            "耗散遍历完成"
        );
        Ok(())
    }

    /// 着色并行
    ///
    /// 每个颜色内并行计算边贡献，再按边序散射。颜色顺序固定，结果可复现。
    fn compute_colored<G, S>(&self, geometry: &G, state: &S, acc: &mut DissipationAccumulator)
    where
        G: GeometryProvider + ?Sized,
        S: FluidStateProvider + ?Sized,
    {
        let Some(coloring) = &self.coloring else {
            self.kernel.accumulate(geometry, state, acc);
            return;
        };

        for edges in &coloring.color_edges {
            let results: Vec<_> = edges
                .par_iter()
                .map(|&e| self.kernel.edge_contribution(geometry, state, e))
                .collect();

            // 同色边无公共节点
            for c in results {
                acc.scatter(c.i, c.j, &c.flux);
            }
        }
    }

    /// 私有累加器归约
    fn compute_private_reduce<G, S>(&self, geometry: &G, state: &S, acc: &mut DissipationAccumulator)
    where
        G: GeometryProvider + ?Sized,
        S: FluidStateProvider + ?Sized,
    {
        let n_nodes = acc.n_nodes();
        let reduced = (0..geometry.n_edges())
            .into_par_iter()
            .with_min_len(MIN_EDGES_PER_TASK)
            .fold(
                || DissipationAccumulator::new(n_nodes),
                |mut local, e| {
                    let c = self.kernel.edge_contribution(geometry, state, e);
                    local.scatter(c.i, c.j, &c.flux);
                    local
                },
            )
            .reduce(
                || DissipationAccumulator::new(n_nodes),
                |mut a, b| {
                    a.merge(&b);
                    a
                },
            );
        acc.merge(&reduced);
    }

    /// 原子累加
    fn compute_atomic<G, S>(&self, geometry: &G, state: &S, acc: &mut DissipationAccumulator)
    where
        G: GeometryProvider + ?Sized,
        S: FluidStateProvider + ?Sized,
    {
        let atomic = AtomicDissipationAccumulator::new(acc.n_nodes());
        (0..geometry.n_edges()).into_par_iter().for_each(|e| {
            let c = self.kernel.edge_contribution(geometry, state, e);
            atomic.scatter(c.i, c.j, &c.flux);
        });
        atomic.add_into(acc);
    }
}

// ============================================================
// 测试
// ============================================================
