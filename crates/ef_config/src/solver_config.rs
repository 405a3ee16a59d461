// crates/ef_config/src/solver_config.rs

//! SolverConfig - 求解器配置（全 f64）
//!
//! 定义耗散算子及其协作者的全部配置参数。配置在加载时验证一次，
//! 之后以只读引用传入计算核心。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 求解器配置
///
/// 所有分区均可缺省，空 JSON 对象 `{}` 即得到默认配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// 气体性质
    #[serde(default)]
    pub gas: GasConfig,

    /// 人工耗散参数
    #[serde(default)]
    pub dissipation: DissipationConfig,

    /// 并行策略
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// 自由来流
    #[serde(default)]
    pub freestream: FreestreamConfig,

    /// 矩形网格
    #[serde(default)]
    pub mesh: MeshConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,
}

// ============================================================================
// 气体
// ============================================================================

/// 量热完全气体参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasConfig {
    /// 比热比 γ
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// 定压比热 cp [J/(kg·K)]
    #[serde(default = "default_cp")]
    pub cp: f64,
}

fn default_gamma() -> f64 { 1.4 }
fn default_cp() -> f64 { 1004.5 }

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gamma: default_gamma(),
            cp: default_cp(),
        }
    }
}

impl GasConfig {
    /// 验证气体参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gamma > 1.0) || !self.gamma.is_finite() {
            return Err(ConfigError::invalid("gas.gamma", self.gamma, "比热比必须大于 1"));
        }
        if !(self.cp > 0.0) || !self.cp.is_finite() {
            return Err(ConfigError::invalid("gas.cp", self.cp, "定压比热必须为正"));
        }
        Ok(())
    }
}

// ============================================================================
// 耗散
// ============================================================================

/// 低马赫预处理参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreconditioningConfig {
    /// 是否启用预处理
    #[serde(default)]
    pub enabled: bool,

    /// 截断系数 K
    #[serde(default = "default_precond_coeff")]
    pub coeff: f64,

    /// 参考马赫数 M∞
    #[serde(default = "default_reference_mach")]
    pub reference_mach: f64,
}

fn default_precond_coeff() -> f64 { 1.0 }
fn default_reference_mach() -> f64 { 0.1 }

impl Default for PreconditioningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            coeff: default_precond_coeff(),
            reference_mach: default_reference_mach(),
        }
    }
}

/// 迎风耗散参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DissipationConfig {
    /// 熵修正系数，δ = coeff · c̃
    #[serde(default = "default_entropy_fix_coeff")]
    pub entropy_fix_coeff: f64,

    /// 耗散混合系数 β ∈ [0, 1]
    #[serde(default = "default_dissipation_blend")]
    pub dissipation_blend: f64,

    /// 低马赫预处理
    #[serde(default)]
    pub preconditioning: PreconditioningConfig,
}

fn default_entropy_fix_coeff() -> f64 { 0.05 }
fn default_dissipation_blend() -> f64 { 1.0 }

impl Default for DissipationConfig {
    fn default() -> Self {
        Self {
            entropy_fix_coeff: default_entropy_fix_coeff(),
            dissipation_blend: default_dissipation_blend(),
            preconditioning: PreconditioningConfig::default(),
        }
    }
}

impl DissipationConfig {
    /// 启用预处理的便捷构造
    pub fn preconditioned(coeff: f64, reference_mach: f64) -> Self {
        Self {
            preconditioning: PreconditioningConfig {
                enabled: true,
                coeff,
                reference_mach,
            },
            ..Self::default()
        }
    }

    /// 验证耗散参数
    ///
    /// 熵修正系数为零会让熵修正公式除零，因此在这里拒绝。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.entropy_fix_coeff > 0.0) || !self.entropy_fix_coeff.is_finite() {
            return Err(ConfigError::invalid(
                "dissipation.entropy_fix_coeff",
                self.entropy_fix_coeff,
                "熵修正系数必须为正",
            ));
        }
        if !(0.0..=1.0).contains(&self.dissipation_blend) {
            return Err(ConfigError::invalid(
                "dissipation.dissipation_blend",
                self.dissipation_blend,
                "混合系数必须在 [0, 1] 范围内",
            ));
        }
        let pc = &self.preconditioning;
        if pc.enabled {
            if !(pc.coeff > 0.0) || !pc.coeff.is_finite() {
                return Err(ConfigError::invalid(
                    "dissipation.preconditioning.coeff",
                    pc.coeff,
                    "预处理系数必须为正",
                ));
            }
            if !(pc.reference_mach > 0.0) || !pc.reference_mach.is_finite() {
                return Err(ConfigError::invalid(
                    "dissipation.preconditioning.reference_mach",
                    pc.reference_mach,
                    "参考马赫数必须为正",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// 并行
// ============================================================================

/// 边循环的并行策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParallelStrategy {
    /// 顺序执行
    Sequential,
    /// 边着色：同色边无公共节点，色内并行
    Colored,
    /// 每个工作线程私有累加器，最后归约
    PrivateReduce,
    /// 原子比较交换累加
    Atomic,
    /// 按问题规模自动选择
    #[default]
    Auto,
}

impl ParallelStrategy {
    /// 策略名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Colored => "colored",
            Self::PrivateReduce => "private_reduce",
            Self::Atomic => "atomic",
            Self::Auto => "auto",
        }
    }
}

impl std::str::FromStr for ParallelStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "colored" | "coloring" => Ok(Self::Colored),
            "private_reduce" | "private" | "reduce" => Ok(Self::PrivateReduce),
            "atomic" => Ok(Self::Atomic),
            "auto" => Ok(Self::Auto),
            other => Err(ConfigError::invalid(
                "parallel.strategy",
                other,
                "可选值: sequential, colored, private_reduce, atomic, auto",
            )),
        }
    }
}

/// 并行配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// 并行策略
    #[serde(default)]
    pub strategy: ParallelStrategy,

    /// 自动模式下启用并行的最小边数
    #[serde(default = "default_min_parallel_size")]
    pub min_parallel_size: usize,
}

fn default_min_parallel_size() -> usize { 2048 }

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            strategy: ParallelStrategy::default(),
            min_parallel_size: default_min_parallel_size(),
        }
    }
}

// ============================================================================
// 自由来流与网格
// ============================================================================

/// 自由来流状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreestreamConfig {
    /// 马赫数
    #[serde(default = "default_mach")]
    pub mach: f64,

    /// 攻角 [度]
    #[serde(default)]
    pub alpha_deg: f64,

    /// 静压 [Pa]
    #[serde(default = "default_pressure")]
    pub pressure: f64,

    /// 密度 [kg/m³]
    #[serde(default = "default_density")]
    pub density: f64,
}

fn default_mach() -> f64 { 0.5 }
fn default_pressure() -> f64 { 1.0e5 }
fn default_density() -> f64 { 1.2 }

impl Default for FreestreamConfig {
    fn default() -> Self {
        Self {
            mach: default_mach(),
            alpha_deg: 0.0,
            pressure: default_pressure(),
            density: default_density(),
        }
    }
}

/// 矩形网格配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// x 方向单元数
    #[serde(default = "default_cells")]
    pub nx: usize,

    /// y 方向单元数
    #[serde(default = "default_cells")]
    pub ny: usize,

    /// 宽度 [m]
    #[serde(default = "default_extent")]
    pub width: f64,

    /// 高度 [m]
    #[serde(default = "default_extent")]
    pub height: f64,
}

fn default_cells() -> usize { 64 }
fn default_extent() -> f64 { 1.0 }

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            nx: default_cells(),
            ny: default_cells(),
            width: default_extent(),
            height: default_extent(),
        }
    }
}

// ============================================================================
// 输出
// ============================================================================

/// 可输出的节点标量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputField {
    /// 密度
    Rho,
    /// x 速度
    U,
    /// y 速度
    V,
    /// 静压
    P,
    /// 总压
    Ptot,
    /// 静温
    Temp,
    /// 总温
    Ttot,
    /// 马赫数
    Mach,
    /// 等熵马赫数
    Machis,
    /// 总压损失
    Ptloss,
    /// 耗散通量（四个分量）
    Dissipation,
}

impl OutputField {
    /// VTK 标量名
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rho => "density",
            Self::U => "u",
            Self::V => "v",
            Self::P => "pressure",
            Self::Ptot => "total_pressure",
            Self::Temp => "temperature",
            Self::Ttot => "total_temperature",
            Self::Mach => "mach",
            Self::Machis => "isentropic_mach",
            Self::Ptloss => "total_pressure_loss",
            Self::Dissipation => "dissipation",
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// 文件名前缀
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// 输出的标量列表
    #[serde(default = "default_fields")]
    pub fields: Vec<OutputField>,
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_prefix() -> String { "flow_".to_string() }
fn default_fields() -> Vec<OutputField> {
    vec![
        OutputField::Rho,
        OutputField::U,
        OutputField::V,
        OutputField::P,
        OutputField::Mach,
    ]
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            prefix: default_prefix(),
            fields: default_fields(),
        }
    }
}

// ============================================================================
// 加载与验证
// ============================================================================

impl SolverConfig {
    /// 从 JSON 字符串解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gas.validate()?;
        self.dissipation.validate()?;

        let fs = &self.freestream;
        if !(fs.mach >= 0.0) || !fs.mach.is_finite() {
            return Err(ConfigError::invalid("freestream.mach", fs.mach, "马赫数不能为负"));
        }
        if !(fs.pressure > 0.0) {
            return Err(ConfigError::invalid("freestream.pressure", fs.pressure, "压力必须为正"));
        }
        if !(fs.density > 0.0) {
            return Err(ConfigError::invalid("freestream.density", fs.density, "密度必须为正"));
        }

        let mesh = &self.mesh;
        if mesh.nx == 0 || mesh.ny == 0 {
            return Err(ConfigError::invalid(
                "mesh.nx/ny",
                format!("{}x{}", mesh.nx, mesh.ny),
                "单元数必须至少为 1",
            ));
        }
        if !(mesh.width > 0.0) || !(mesh.height > 0.0) {
            return Err(ConfigError::invalid(
                "mesh.width/height",
                format!("{}x{}", mesh.width, mesh.height),
                "计算域尺寸必须为正",
            ));
        }

        if self.output.prefix.is_empty() {
            return Err(ConfigError::Missing("output.prefix".to_string()));
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}
