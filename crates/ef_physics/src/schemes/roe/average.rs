// crates/ef_physics/src/schemes/roe/average.rs

//! Roe 平均状态

use glam::DVec2;

use crate::state::{ConservativeVars, DependentVars};

/// 边上的 Roe 平均状态
///
/// 以 `dd = sqrt(ρR/ρL)` 为权重：`x̃ = (xL + dd·xR) / (1 + dd)`。
/// 每条边临时构造，不缓存。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoeAverage {
    /// ρ̃ = sqrt(ρL·ρR)
    pub dens: f64,
    /// ũ
    pub u: f64,
    /// ṽ
    pub v: f64,
    /// p̃
    pub press: f64,
    /// T̃
    pub temp: f64,
    /// 总焓 H̃
    pub enthalpy: f64,
    /// c̃ = sqrt((γ̃-1)(H̃ - ½q̃²))
    pub sound: f64,
    /// 两端 γ 的算术平均
    pub gamma: f64,
    /// 两端 cp 的算术平均（即 hT）
    pub cp: f64,
}

impl RoeAverage {
    /// 由左右节点状态计算 Roe 平均
    #[inline]
    pub fn compute(
        left: &ConservativeVars,
        left_dv: &DependentVars,
        right: &ConservativeVars,
        right_dv: &DependentVars,
    ) -> Self {
        let rl = left.dens;
        let rr = right.dens;
        let vel_l = left.velocity();
        let vel_r = right.velocity();
        let hl = left.total_enthalpy(left_dv.press);
        let hr = right.total_enthalpy(right_dv.press);

        let rav = (rl * rr).sqrt();
        let dd = rav / rl;
        let dd1 = 1.0 / (1.0 + dd);

        let u = (vel_l.x + dd * vel_r.x) * dd1;
        let v = (vel_l.y + dd * vel_r.y) * dd1;
        let press = (left_dv.press + dd * right_dv.press) * dd1;
        let temp = (left_dv.temp + dd * right_dv.temp) * dd1;
        let enthalpy = (hl + dd * hr) * dd1;

        let gamma = 0.5 * (left_dv.gamma + right_dv.gamma);
        let q2 = u * u + v * v;
        let sound = ((gamma - 1.0) * (enthalpy - 0.5 * q2)).sqrt();

        Self {
            dens: rav,
            u,
            v,
            press,
            temp,
            enthalpy,
            sound,
            gamma,
            cp: 0.5 * (left_dv.cpgas + right_dv.cpgas),
        }
    }

    /// 速度平方 q̃²
    #[inline]
    pub fn q2(&self) -> f64 {
        self.u * self.u + self.v * self.v
    }

    /// 法向速度 Ṽ = ũ·n
    #[inline]
    pub fn normal_velocity(&self, normal: DVec2) -> f64 {
        self.u * normal.x + self.v * normal.y
    }

    /// ∂ρ/∂p|_T = ρ̃/p̃
    #[inline]
    pub fn rhop(&self) -> f64 {
        self.dens / self.press
    }

    /// ∂ρ/∂T|_p = -ρ̃/T̃
    #[inline]
    pub fn rhot(&self) -> f64 {
        -self.dens / self.temp
    }
}
