// crates/ef_physics/src/state.rs

//! 可压缩流动状态管理
//!
//! 本模块提供节点上的流动状态：
//! - ConservativeVars / FlowState: 守恒变量 (ρ, ρu, ρv, ρE)
//! - DependentVars / DependentState: 依赖变量 (p, T, c, γ, cp)
//! - FlowField: 两者的快照，实现 [`FluidStateProvider`]
//!
//! # 布局设计
//!
//! 采用 SoA (Structure of Arrays) 布局：
//! ```text
//! dens: [ρ_0,  ρ_1,  ρ_2,  ...]
//! xmom: [ρu_0, ρu_1, ρu_2, ...]
//! ymom: [ρv_0, ρv_1, ρv_2, ...]
//! ener: [ρE_0, ρE_1, ρE_2, ...]
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use ef_foundation::error::{EfError, EfResult};

use crate::traits::FluidStateProvider;

// ============================================================
// 单节点变量
// ============================================================

/// 单个节点的守恒变量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConservativeVars {
    /// 密度 ρ [kg/m³]
    pub dens: f64,
    /// x 动量 ρu
    pub xmom: f64,
    /// y 动量 ρv
    pub ymom: f64,
    /// 总能 ρE [J/m³]
    pub ener: f64,
}

impl ConservativeVars {
    /// 创建守恒变量
    #[inline]
    pub const fn new(dens: f64, xmom: f64, ymom: f64, ener: f64) -> Self {
        Self {
            dens,
            xmom,
            ymom,
            ener,
        }
    }

    /// 零状态
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// 速度 (u, v)
    #[inline]
    pub fn velocity(&self) -> DVec2 {
        DVec2::new(self.xmom, self.ymom) / self.dens
    }

    /// 总焓 H = (ρE + p) / ρ
    #[inline]
    pub fn total_enthalpy(&self, press: f64) -> f64 {
        (self.ener + press) / self.dens
    }

    /// 所有分量有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.dens.is_finite() && self.xmom.is_finite() && self.ymom.is_finite() && self.ener.is_finite()
    }
}

impl Add for ConservativeVars {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.dens + rhs.dens,
            self.xmom + rhs.xmom,
            self.ymom + rhs.ymom,
            self.ener + rhs.ener,
        )
    }
}

impl Sub for ConservativeVars {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.dens - rhs.dens,
            self.xmom - rhs.xmom,
            self.ymom - rhs.ymom,
            self.ener - rhs.ener,
        )
    }
}

impl Mul<f64> for ConservativeVars {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.dens * rhs, self.xmom * rhs, self.ymom * rhs, self.ener * rhs)
    }
}

/// 单个节点的依赖变量
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DependentVars {
    /// 静压 p [Pa]
    pub press: f64,
    /// 静温 T [K]
    pub temp: f64,
    /// 声速 c [m/s]
    pub sound: f64,
    /// 比热比 γ
    pub gamma: f64,
    /// 定压比热 cp [J/(kg·K)]
    pub cpgas: f64,
}

// ============================================================
// 守恒状态 (SoA 布局)
// ============================================================

/// 守恒变量场（SoA 布局）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowState {
    n_nodes: usize,
    /// 密度
    pub dens: Vec<f64>,
    /// x 动量
    pub xmom: Vec<f64>,
    /// y 动量
    pub ymom: Vec<f64>,
    /// 总能
    pub ener: Vec<f64>,
}

impl FlowState {
    /// 创建零状态
    pub fn new(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            dens: vec![0.0; n_nodes],
            xmom: vec![0.0; n_nodes],
            ymom: vec![0.0; n_nodes],
            ener: vec![0.0; n_nodes],
        }
    }

    /// 所有节点取同一状态
    pub fn uniform(n_nodes: usize, cv: ConservativeVars) -> Self {
        Self {
            n_nodes,
            dens: vec![cv.dens; n_nodes],
            xmom: vec![cv.xmom; n_nodes],
            ymom: vec![cv.ymom; n_nodes],
            ener: vec![cv.ener; n_nodes],
        }
    }

    /// 按节点函数初始化
    pub fn from_fn<F>(n_nodes: usize, f: F) -> Self
    where
        F: Fn(usize) -> ConservativeVars,
    {
        let mut state = Self::new(n_nodes);
        for i in 0..n_nodes {
            state.set(i, f(i));
        }
        state
    }

    /// 节点数量
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// 获取节点的守恒变量
    #[inline]
    pub fn get(&self, idx: usize) -> ConservativeVars {
        ConservativeVars::new(self.dens[idx], self.xmom[idx], self.ymom[idx], self.ener[idx])
    }

    /// 设置节点的守恒变量
    #[inline]
    pub fn set(&mut self, idx: usize, cv: ConservativeVars) {
        self.dens[idx] = cv.dens;
        self.xmom[idx] = cv.xmom;
        self.ymom[idx] = cv.ymom;
        self.ener[idx] = cv.ener;
    }

    /// 检查各数组长度一致
    pub fn validate_sizes(&self) -> EfResult<()> {
        for (name, len) in [
            ("dens", self.dens.len()),
            ("xmom", self.xmom.len()),
            ("ymom", self.ymom.len()),
            ("ener", self.ener.len()),
        ] {
            if len != self.n_nodes {
                return Err(EfError::size_mismatch(name, self.n_nodes, len));
            }
        }
        Ok(())
    }
}

// ============================================================
// 依赖状态 (SoA 布局)
// ============================================================

/// 依赖变量场（SoA 布局）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependentState {
    n_nodes: usize,
    /// 静压
    pub press: Vec<f64>,
    /// 静温
    pub temp: Vec<f64>,
    /// 声速
    pub sound: Vec<f64>,
    /// 比热比
    pub gamma: Vec<f64>,
    /// 定压比热
    pub cpgas: Vec<f64>,
}

impl DependentState {
    /// 创建零状态
    pub fn new(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            press: vec![0.0; n_nodes],
            temp: vec![0.0; n_nodes],
            sound: vec![0.0; n_nodes],
            gamma: vec![0.0; n_nodes],
            cpgas: vec![0.0; n_nodes],
        }
    }

    /// 节点数量
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// 获取节点的依赖变量
    #[inline]
    pub fn get(&self, idx: usize) -> DependentVars {
        DependentVars {
            press: self.press[idx],
            temp: self.temp[idx],
            sound: self.sound[idx],
            gamma: self.gamma[idx],
            cpgas: self.cpgas[idx],
        }
    }

    /// 设置节点的依赖变量
    #[inline]
    pub fn set(&mut self, idx: usize, dv: DependentVars) {
        self.press[idx] = dv.press;
        self.temp[idx] = dv.temp;
        self.sound[idx] = dv.sound;
        self.gamma[idx] = dv.gamma;
        self.cpgas[idx] = dv.cpgas;
    }
}

// ============================================================
// 流场快照
// ============================================================

/// 守恒变量与依赖变量的一致快照
///
/// 耗散计算期间只读借用。
#[derive(Debug, Clone)]
pub struct FlowField {
    /// 守恒变量
    pub conservative: FlowState,
    /// 依赖变量
    pub dependent: DependentState,
}

impl FlowField {
    /// 组合快照，检查节点数一致
    pub fn new(conservative: FlowState, dependent: DependentState) -> EfResult<Self> {
        conservative.validate_sizes()?;
        if dependent.n_nodes() != conservative.n_nodes() {
            return Err(EfError::size_mismatch(
                "dependent",
                conservative.n_nodes(),
                dependent.n_nodes(),
            ));
        }
        Ok(Self {
            conservative,
            dependent,
        })
    }
}

impl FluidStateProvider for FlowField {
    #[inline]
    fn n_nodes(&self) -> usize {
        self.conservative.n_nodes()
    }

    #[inline]
    fn conservative(&self, i: usize) -> ConservativeVars {
        self.conservative.get(i)
    }

    #[inline]
    fn dependent(&self, i: usize) -> DependentVars {
        self.dependent.get(i)
    }
}
