// crates/ef_physics/src/schemes/roe/dissipation.rs

//! 边基一阶迎风耗散
//!
//! 核心计算对每条边是纯函数：只读两端节点状态和面向量，
//! 返回要散射到两端节点的通量。累加与并行由 `engine` 负责。

use glam::DVec2;
use nalgebra::Vector5;

use ef_config::DissipationConfig;
use ef_foundation::error::{EfError, EfResult};

use super::average::RoeAverage;
use super::entropy::entropy_correction;
use super::precond::{matvec_prod5, CharacteristicState, Preconditioner};
use crate::engine::accumulator::DissipationAccumulator;
use crate::state::{ConservativeVars, DependentVars};
use crate::traits::{FluidStateProvider, GeometryProvider};

/// 单条边的耗散贡献
///
/// `flux` 加到节点 i，`-flux` 加到节点 j。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeContribution {
    /// 起点
    pub i: usize,
    /// 终点
    pub j: usize,
    /// 已乘 ds·β/2 的通量
    pub flux: ConservativeVars,
}

/// 预处理 Roe 耗散算子
#[derive(Debug, Clone, Copy)]
pub struct RoeDissipation {
    entropy_fix_coeff: f64,
    blend: f64,
    precond: Preconditioner,
}

impl RoeDissipation {
    /// 由耗散配置构建，配置无效时拒绝
    pub fn new(config: &DissipationConfig) -> EfResult<Self> {
        config.validate().map_err(EfError::from)?;
        Ok(Self {
            entropy_fix_coeff: config.entropy_fix_coeff,
            blend: config.dissipation_blend,
            precond: Preconditioner::from_config(&config.preconditioning),
        })
    }

    /// 熵修正系数
    pub fn entropy_fix_coeff(&self) -> f64 {
        self.entropy_fix_coeff
    }

    /// 混合系数 β
    pub fn blend(&self) -> f64 {
        self.blend
    }

    /// 预处理参数
    pub fn preconditioner(&self) -> &Preconditioner {
        &self.precond
    }

    /// 计算一条边的耗散通量
    ///
    /// # 参数
    /// - `left`, `left_dv`: 节点 i 的守恒/依赖变量
    /// - `right`, `right_dv`: 节点 j 的守恒/依赖变量
    /// - `sij`: 面向量，从 i 指向 j，长度为对偶面面积
    ///
    /// # 返回
    /// 已乘 `ds·β/2` 的通量；加到 i，从 j 减去
    pub fn edge_flux(
        &self,
        left: &ConservativeVars,
        left_dv: &DependentVars,
        right: &ConservativeVars,
        right_dv: &DependentVars,
        sij: DVec2,
    ) -> ConservativeVars {
        let ds = sij.length();
        let normal = sij / ds;

        let avg = RoeAverage::compute(left, left_dv, right, right_dv);
        let q2a = avg.q2();
        let uv = avg.normal_velocity(normal);

        let theta = self.precond.compute_theta(avg.gamma, avg.sound, q2a);
        let cs = CharacteristicState {
            dens: avg.dens,
            u: avg.u,
            v: avg.v,
            enthalpy: avg.enthalpy,
            normal,
            vn: uv,
            theta,
            rhop: avg.rhop(),
            rhot: avg.rhot(),
            hp: 0.0,
            ht: avg.cp,
        };

        // 熵修正后的特征值幅值
        let delta = self.entropy_fix_coeff * avg.sound;
        let eig = cs.eigenvalues();
        let eabs2 = entropy_correction(uv, delta);
        let eabs1 = entropy_correction(eig.plus, delta);
        let eabs5 = entropy_correction(eig.minus, delta);

        let gtp = cs.right_eigenvec(&eig);
        let tp1 = cs.matprod_tp1_p1(&eig);

        // 守恒跳跃，z 动量分量为零
        let wrl = Vector5::new(
            right.dens - left.dens,
            right.xmom - left.xmom,
            right.ymom - left.ymom,
            0.0,
            right.ener - left.ener,
        );

        let mut dum = matvec_prod5(&tp1, &wrl);
        dum[0] *= eabs2;
        dum[1] *= eabs2;
        dum[2] *= eabs2;
        dum[3] *= eabs1;
        dum[4] *= eabs5;
        let fd = matvec_prod5(&gtp, &dum);

        let scale = 0.5 * self.blend * ds;
        ConservativeVars::new(fd[0] * scale, fd[1] * scale, fd[2] * scale, fd[4] * scale)
    }

    /// 计算网格中第 `e` 条边的贡献
    #[inline]
    pub fn edge_contribution<G, S>(&self, geometry: &G, state: &S, e: usize) -> EdgeContribution
    where
        G: GeometryProvider + ?Sized,
        S: FluidStateProvider + ?Sized,
    {
        let (i, j) = geometry.edge_nodes(e);
        let flux = self.edge_flux(
            &state.conservative(i),
            &state.dependent(i),
            &state.conservative(j),
            &state.dependent(j),
            geometry.face_vector(e),
        );
        EdgeContribution { i, j, flux }
    }

    /// 顺序遍历全部边并累加
    ///
    /// 累加器由调用方清零；本函数只做加法。
    pub fn accumulate<G, S>(&self, geometry: &G, state: &S, acc: &mut DissipationAccumulator)
    where
        G: GeometryProvider + ?Sized,
        S: FluidStateProvider + ?Sized,
    {
        for e in 0..geometry.n_edges() {
            let c = self.edge_contribution(geometry, state, e);
            acc.scatter(c.i, c.j, &c.flux);
        }
    }
}

/// 一次完整的耗散遍历（顺序）
///
/// 验证配置和数组长度后，把每条边的贡献加到 `acc`。
/// 非有限值不在遍历中拦截，调用方用 [`DissipationAccumulator::check_finite`] 检测。
pub fn compute_dissipation<G, S>(
    geometry: &G,
    state: &S,
    config: &DissipationConfig,
    acc: &mut DissipationAccumulator,
) -> EfResult<()>
where
    G: GeometryProvider + ?Sized,
    S: FluidStateProvider + ?Sized,
{
    let kernel = RoeDissipation::new(config)?;
    check_sizes(geometry, state, acc)?;
    kernel.accumulate(geometry, state, acc);
    Ok(())
}

/// 检查几何、状态、累加器的节点数一致
pub(crate) fn check_sizes<G, S>(geometry: &G, state: &S, acc: &DissipationAccumulator) -> EfResult<()>
where
    G: GeometryProvider + ?Sized,
    S: FluidStateProvider + ?Sized,
{
    let n = geometry.n_nodes();
    if state.n_nodes() != n {
        return Err(EfError::size_mismatch("state", n, state.n_nodes()));
    }
    if acc.n_nodes() != n {
        return Err(EfError::size_mismatch("dissipation", n, acc.n_nodes()));
    }
    Ok(())
}
