// crates/ef_physics/src/output/flowfield.rs

//! 节点导出量
//!
//! ```text
//! Ttot   = (e + p/ρ) / cp
//! ptot   = p (Ttot/T)^(γ/(γ-1))
//! ptloss = 1 - ptot/ptref
//! Mis    = sqrt(max(((ptref/p)^((γ-1)/γ) - 1) · 2/(γ-1), 0))
//! ```
//!
//! 参考总压 `ptref`：外流取来流总压，内流取入口总压。

use serde::{Deserialize, Serialize};

use ef_config::OutputField;

use crate::state::FlowField;

/// 来流总压 p∞ (1 + ½(γ-1)M∞²)^(γ/(γ-1))
pub fn freestream_total_pressure(gamma: f64, mach: f64, press: f64) -> f64 {
    let gam1 = gamma - 1.0;
    press * (1.0 + 0.5 * gam1 * mach * mach).powf(gamma / gam1)
}

/// 全场导出量快照（SoA 布局）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowfieldSnapshot {
    /// 参考总压
    pub reference_total_pressure: f64,
    /// 密度
    pub dens: Vec<f64>,
    /// x 速度
    pub u: Vec<f64>,
    /// y 速度
    pub v: Vec<f64>,
    /// 静压
    pub press: Vec<f64>,
    /// 静温
    pub temp: Vec<f64>,
    /// 声速
    pub sound: Vec<f64>,
    /// 马赫数
    pub mach: Vec<f64>,
    /// 总温
    pub ttot: Vec<f64>,
    /// 总压
    pub ptot: Vec<f64>,
    /// 总压损失
    pub ptloss: Vec<f64>,
    /// 等熵马赫数
    pub machis: Vec<f64>,
}

impl FlowfieldSnapshot {
    /// 计算全场导出量
    pub fn compute(field: &FlowField, reference_total_pressure: f64) -> Self {
        let n = field.conservative.n_nodes();
        let mut snap = Self {
            reference_total_pressure,
            dens: Vec::with_capacity(n),
            u: Vec::with_capacity(n),
            v: Vec::with_capacity(n),
            press: Vec::with_capacity(n),
            temp: Vec::with_capacity(n),
            sound: Vec::with_capacity(n),
            mach: Vec::with_capacity(n),
            ttot: Vec::with_capacity(n),
            ptot: Vec::with_capacity(n),
            ptloss: Vec::with_capacity(n),
            machis: Vec::with_capacity(n),
        };

        for i in 0..n {
            let cv = field.conservative.get(i);
            let dv = field.dependent.get(i);
            let rho = cv.dens;
            let vel = cv.velocity();
            let gam1 = dv.gamma - 1.0;
            let ggm1 = dv.gamma / gam1;

            let e = cv.ener / rho;
            let ttot = (e + dv.press / rho) / dv.cpgas;
            let ptot = dv.press * (ttot / dv.temp).powf(ggm1);
            let machis = (((reference_total_pressure / dv.press).powf(1.0 / ggm1) - 1.0) * 2.0 / gam1)
                .max(0.0)
                .sqrt();

            snap.dens.push(rho);
            snap.u.push(vel.x);
            snap.v.push(vel.y);
            snap.press.push(dv.press);
            snap.temp.push(dv.temp);
            snap.sound.push(dv.sound);
            snap.mach.push(vel.length() / dv.sound);
            snap.ttot.push(ttot);
            snap.ptot.push(ptot);
            snap.ptloss.push(1.0 - ptot / reference_total_pressure);
            snap.machis.push(machis);
        }
        snap
    }

    /// 节点数量
    pub fn n_nodes(&self) -> usize {
        self.dens.len()
    }

    /// 按输出字段取数组；耗散不属于快照，返回 `None`
    pub fn scalar(&self, field: OutputField) -> Option<&[f64]> {
        let values = match field {
            OutputField::Rho => &self.dens,
            OutputField::U => &self.u,
            OutputField::V => &self.v,
            OutputField::P => &self.press,
            OutputField::Ptot => &self.ptot,
            OutputField::Temp => &self.temp,
            OutputField::Ttot => &self.ttot,
            OutputField::Mach => &self.mach,
            OutputField::Machis => &self.machis,
            OutputField::Ptloss => &self.ptloss,
            OutputField::Dissipation => return None,
        };
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas::PerfectGas;
    use crate::state::FlowState;

    fn freestream_field(mach: f64) -> (FlowField, f64) {
        let gas = PerfectGas::default();
        let cv = gas.freestream(mach, 0.0, 1.0e5, 1.2);
        let state = FlowState::uniform(3, cv);
        let dep = gas.update_dependent(&state);
        let ptref = freestream_total_pressure(gas.gamma, mach, 1.0e5);
        (FlowField::new(state, dep).unwrap(), ptref)
    }

    #[test]
    fn test_freestream_total_pressure() {
        assert!((freestream_total_pressure(1.4, 0.0, 1.0e5) - 1.0e5).abs() < 1e-9);
        // M = 1: (1.2)^3.5
        let pt = freestream_total_pressure(1.4, 1.0, 1.0);
        assert!((pt - 1.2f64.powf(3.5)).abs() < 1e-12);
    }

    #[test]
    fn test_freestream_has_no_loss() {
        let (field, ptref) = freestream_field(0.6);
        let snap = FlowfieldSnapshot::compute(&field, ptref);
        for i in 0..snap.n_nodes() {
            assert!((snap.mach[i] - 0.6).abs() < 1e-12);
            assert!(snap.ptloss[i].abs() < 1e-10);
            assert!((snap.machis[i] - 0.6).abs() < 1e-8);
            assert!((snap.ptot[i] / ptref - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_total_temperature() {
        let (field, ptref) = freestream_field(0.8);
        let snap = FlowfieldSnapshot::compute(&field, ptref);
        let expected = snap.temp[0] * (1.0 + 0.2 * 0.8 * 0.8);
        assert!((snap.ttot[0] - expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn test_isentropic_mach_clipped() {
        // 参考总压低于静压时等熵马赫数取零
        let (field, _) = freestream_field(0.3);
        let snap = FlowfieldSnapshot::compute(&field, 0.5e5);
        assert_eq!(snap.machis[0], 0.0);
    }

    #[test]
    fn test_scalar_lookup() {
        let (field, ptref) = freestream_field(0.5);
        let snap = FlowfieldSnapshot::compute(&field, ptref);
        assert_eq!(snap.scalar(OutputField::P).map(|s| s.len()), Some(3));
        assert!(snap.scalar(OutputField::Dissipation).is_none());
    }
}
