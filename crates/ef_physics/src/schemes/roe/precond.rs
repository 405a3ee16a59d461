// crates/ef_physics/src/schemes/roe/precond.rs

//! 低马赫数预处理
//!
//! 原始变量 `Wp = (p, u, v, w, T)`，守恒变量 `W = (ρ, ρu, ρv, ρw, ρE)`。
//! 预处理方程 `Γ ∂Wp/∂t + A_p ∂Wp/∂x = 0` 的耗散项为
//!
//! ```text
//! D = Γ · R · |Λ| · R⁻¹ · M⁻¹ · ΔW
//!     └─gtp─┘        └──tp1───┘
//! ```
//!
//! 其中 `M = ∂W/∂Wp`，`Γ` 是把 M 第一列中 `∂ρ/∂p` 换成 θ 得到的矩阵，
//! `R` 为 `Γ⁻¹A_p` 的右特征向量。θ = ∂ρ/∂p 时 Γ = M，格式退化为经典 Roe。
//!
//! 第 4 个分量（z 动量）在二维计算中恒为零，保留 5×5 布局以维持
//! 特征值到分量的对应关系。

use glam::DVec2;
use nalgebra::{Matrix5, Vector5};

use ef_config::PreconditioningConfig;

/// Weiss–Smith 预处理参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preconditioner {
    enabled: bool,
    coeff: f64,
    reference_mach: f64,
}

impl Preconditioner {
    /// 从配置构建（配置已验证）
    pub fn from_config(config: &PreconditioningConfig) -> Self {
        Self {
            enabled: config.enabled,
            coeff: config.coeff,
            reference_mach: config.reference_mach,
        }
    }

    /// 关闭预处理
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            coeff: 1.0,
            reference_mach: 1.0,
        }
    }

    /// 是否启用
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 计算预处理参数 θ
    ///
    /// ```text
    /// θ = 1/U_r² + (γ-1)/c²
    /// U_r² = c² · min(max(q²/c², K·M∞²), 1)
    /// ```
    ///
    /// 关闭预处理时 `U_r = c`，θ = γ/c² = ∂ρ/∂p。
    ///
    /// 下限 `K·M∞²·c²` 使用边上的 Roe 平均声速，不同于 Weiss–Smith 形式
    /// 中基于来流速度的 `K·q∞²`；局部声速偏离来流声速时两者不同。
    ///
    /// # 参数
    /// - `gamma`: 比热比
    /// - `c`: 声速
    /// - `q2`: 速度平方
    #[inline]
    pub fn compute_theta(&self, gamma: f64, c: f64, q2: f64) -> f64 {
        let c2 = c * c;
        let mref2 = if self.enabled {
            let floor = self.coeff * self.reference_mach * self.reference_mach;
            (q2 / c2).max(floor).min(1.0)
        } else {
            1.0
        };
        1.0 / (mref2 * c2) + (gamma - 1.0) / c2
    }
}

/// 预处理系统的特征值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecondEigenvalues {
    /// 对流特征值 V（前三个分量共用）
    pub convective: f64,
    /// 声学特征值 λ+
    pub plus: f64,
    /// 声学特征值 λ-
    pub minus: f64,
    /// cc2 = ½(λ+ - λ-)
    pub cc2: f64,
}

impl PrecondEigenvalues {
    /// 按分量排列的带符号特征值 `[V, V, V, λ+, λ-]`
    pub fn as_array(&self) -> [f64; 5] {
        let v = self.convective;
        [v, v, v, self.plus, self.minus]
    }
}

/// 单条边上构造特征矩阵所需的全部量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacteristicState {
    /// ρ̃
    pub dens: f64,
    /// ũ
    pub u: f64,
    /// ṽ
    pub v: f64,
    /// 总焓 H̃
    pub enthalpy: f64,
    /// 单位法向
    pub normal: DVec2,
    /// 法向速度 V
    pub vn: f64,
    /// 预处理参数 θ
    pub theta: f64,
    /// ∂ρ/∂p
    pub rhop: f64,
    /// ∂ρ/∂T
    pub rhot: f64,
    /// ∂h/∂p
    pub hp: f64,
    /// ∂h/∂T
    pub ht: f64,
}

impl CharacteristicState {
    /// 速度平方
    #[inline]
    fn q2(&self) -> f64 {
        self.u * self.u + self.v * self.v
    }

    /// 预处理系统特征值
    ///
    /// ```text
    /// a1 = ρ ρp hT + ρT (1 - ρ hp)
    /// a4 = a1 / (ρ θ hT + ρT (1 - ρ hp))
    /// a5 = ρ hT / (ρ θ hT + ρT (1 - ρ hp))
    /// λ± = ½(a4+1)V ± ½ sqrt(V²(a4-1)² + 4a5)
    /// ```
    #[inline]
    pub fn eigenvalues(&self) -> PrecondEigenvalues {
        let rho = self.dens;
        let rt1 = self.rhot * (1.0 - rho * self.hp);
        let a1 = rho * self.rhop * self.ht + rt1;
        let ra1g = 1.0 / (rho * self.theta * self.ht + rt1);
        let a4 = a1 * ra1g;
        let a5 = rho * self.ht * ra1g;
        let v = self.vn;
        let cc2 = 0.5 * (v * v * (a4 - 1.0) * (a4 - 1.0) + 4.0 * a5).sqrt();
        let h2 = 0.5 * (a4 + 1.0) * v;
        PrecondEigenvalues {
            convective: v,
            plus: h2 + cc2,
            minus: h2 - cc2,
            cc2,
        }
    }

    /// 预处理矩阵 Γ
    fn gamma_matrix(&self) -> Matrix5<f64> {
        let rho = self.dens;
        let (u, v, h) = (self.u, self.v, self.enthalpy);
        let (th, rt) = (self.theta, self.rhot);
        Matrix5::new(
            th, 0.0, 0.0, 0.0, rt,
            th * u, rho, 0.0, 0.0, rt * u,
            th * v, 0.0, rho, 0.0, rt * v,
            0.0, 0.0, 0.0, rho, 0.0,
            th * h + rho * self.hp - 1.0, rho * u, rho * v, 0.0, rt * h + rho * self.ht,
        )
    }

    /// 原始变量下的右特征向量 R（按列）
    fn right_primitive(&self, eig: &PrecondEigenvalues) -> Matrix5<f64> {
        let rho = self.dens;
        let (nx, ny) = (self.normal.x, self.normal.y);
        let dp = eig.plus - self.vn;
        let dm = eig.minus - self.vn;
        let g = (1.0 - rho * self.hp) / self.ht;
        Matrix5::new(
            0.0, 0.0, 0.0, rho * dp, rho * dm,
            0.0, -ny, 0.0, nx, nx,
            0.0, nx, 0.0, ny, ny,
            0.0, 0.0, 1.0, 0.0, 0.0,
            1.0, 0.0, 0.0, dp * g, dm * g,
        )
    }

    /// R⁻¹（按行）
    fn left_primitive(&self, eig: &PrecondEigenvalues) -> Matrix5<f64> {
        let rho = self.dens;
        let (nx, ny) = (self.normal.x, self.normal.y);
        let dp = eig.plus - self.vn;
        let dm = eig.minus - self.vn;
        let g = (1.0 - rho * self.hp) / self.ht;
        let r2c = 1.0 / (2.0 * eig.cc2);
        Matrix5::new(
            -g / rho, 0.0, 0.0, 0.0, 1.0,
            0.0, -ny, nx, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
            r2c / rho, -dm * nx * r2c, -dm * ny * r2c, 0.0, 0.0,
            -r2c / rho, dp * nx * r2c, dp * ny * r2c, 0.0, 0.0,
        )
    }

    /// M⁻¹ = ∂Wp/∂W
    fn inverse_transform(&self) -> Matrix5<f64> {
        let rho = self.dens;
        let rr = 1.0 / rho;
        let (u, v) = (self.u, self.v);
        let (rp, rt, hp, ht) = (self.rhop, self.rhot, self.hp, self.ht);
        let rd = 1.0 / (rho * rp * ht + rt * (1.0 - rho * hp));

        // e* = Δ(ρE) - (H - q²)Δρ - uΔ(ρu) - vΔ(ρv)
        let e = [-(self.enthalpy - self.q2()), -u, -v, 0.0, 1.0];
        let c0 = rho * hp - 1.0;

        Matrix5::new(
            (rho * ht - rt * e[0]) * rd, -rt * e[1] * rd, -rt * e[2] * rd, 0.0, -rt * e[4] * rd,
            -u * rr, rr, 0.0, 0.0, 0.0,
            -v * rr, 0.0, rr, 0.0, 0.0,
            0.0, 0.0, 0.0, rr, 0.0,
            (rp * e[0] - c0) * rd, rp * e[1] * rd, rp * e[2] * rd, 0.0, rp * e[4] * rd,
        )
    }

    /// Γ·R：守恒变量下的预处理右特征向量
    pub fn right_eigenvec(&self, eig: &PrecondEigenvalues) -> Matrix5<f64> {
        self.gamma_matrix() * self.right_primitive(eig)
    }

    /// R⁻¹·M⁻¹：守恒跳跃到特征幅值的投影
    pub fn matprod_tp1_p1(&self, eig: &PrecondEigenvalues) -> Matrix5<f64> {
        self.left_primitive(eig) * self.inverse_transform()
    }
}

/// 5×5 矩阵与 5 维向量之积
#[inline]
pub fn matvec_prod5(m: &Matrix5<f64>, v: &Vector5<f64>) -> Vector5<f64> {
    m * v
}
