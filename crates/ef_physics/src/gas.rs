// crates/ef_physics/src/gas.rs

//! 量热完全气体状态方程
//!
//! ```text
//! R = cp (γ-1) / γ
//! p = (γ-1) (ρE - ½ρ|u|²)
//! T = p / (ρR)
//! c = sqrt(γp/ρ)
//! ```

use rayon::prelude::*;

use ef_config::GasConfig;
use ef_foundation::error::{EfError, EfResult};

use crate::state::{ConservativeVars, DependentState, DependentVars, FlowState};

/// 完全气体
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfectGas {
    /// 比热比
    pub gamma: f64,
    /// 定压比热
    pub cp: f64,
}

impl Default for PerfectGas {
    fn default() -> Self {
        Self {
            gamma: 1.4,
            cp: 1004.5,
        }
    }
}

impl PerfectGas {
    /// 创建完全气体，要求 γ > 1 且 cp > 0
    pub fn new(gamma: f64, cp: f64) -> EfResult<Self> {
        if !(gamma > 1.0) || !gamma.is_finite() {
            return Err(EfError::invalid_config("gas.gamma", gamma.to_string(), "比热比必须大于 1"));
        }
        if !(cp > 0.0) || !cp.is_finite() {
            return Err(EfError::invalid_config("gas.cp", cp.to_string(), "定压比热必须为正"));
        }
        Ok(Self { gamma, cp })
    }

    /// 从配置构建
    pub fn from_config(config: &GasConfig) -> EfResult<Self> {
        Self::new(config.gamma, config.cp)
    }

    /// 气体常数 R
    #[inline]
    pub fn gas_constant(&self) -> f64 {
        self.cp * (self.gamma - 1.0) / self.gamma
    }

    /// 由守恒变量计算静压
    #[inline]
    pub fn pressure(&self, cv: &ConservativeVars) -> f64 {
        let q2 = (cv.xmom * cv.xmom + cv.ymom * cv.ymom) / cv.dens;
        (self.gamma - 1.0) * (cv.ener - 0.5 * q2)
    }

    /// 声速
    #[inline]
    pub fn sound_speed(&self, dens: f64, press: f64) -> f64 {
        (self.gamma * press / dens).sqrt()
    }

    /// 单个节点的依赖变量
    #[inline]
    pub fn dependent(&self, cv: &ConservativeVars) -> DependentVars {
        let press = self.pressure(cv);
        DependentVars {
            press,
            temp: press / (cv.dens * self.gas_constant()),
            sound: self.sound_speed(cv.dens, press),
            gamma: self.gamma,
            cpgas: self.cp,
        }
    }

    /// 更新整个场的依赖变量
    ///
    /// 非物理状态（负压、负密度）产生 NaN，不在此处拦截。
    pub fn update_dependent(&self, state: &FlowState) -> DependentState {
        let dvs: Vec<DependentVars> = (0..state.n_nodes())
            .into_par_iter()
            .map(|i| self.dependent(&state.get(i)))
            .collect();

        let mut dependent = DependentState::new(state.n_nodes());
        for (i, dv) in dvs.into_iter().enumerate() {
            dependent.set(i, dv);
        }
        dependent
    }

    /// 由原始变量 (ρ, u, v, p) 构造守恒变量
    #[inline]
    pub fn conservative_from_primitive(&self, dens: f64, u: f64, v: f64, press: f64) -> ConservativeVars {
        let ener = press / (self.gamma - 1.0) + 0.5 * dens * (u * u + v * v);
        ConservativeVars::new(dens, dens * u, dens * v, ener)
    }

    /// 由马赫数、流向角、静压和密度构造来流状态
    pub fn freestream(&self, mach: f64, alpha_rad: f64, press: f64, dens: f64) -> ConservativeVars {
        let c = self.sound_speed(dens, press);
        let speed = mach * c;
        self.conservative_from_primitive(dens, speed * alpha_rad.cos(), speed * alpha_rad.sin(), press)
    }
}
