// crates/ef_physics/src/lib.rs

//! 可压缩欧拉方程的边基迎风耗散
//!
//! 提供二维可压缩无粘流动的数值耗散计算，包括：
//! - 状态管理 (state) - 守恒/依赖变量的 SoA 场
//! - 状态访问抽象 (traits)
//! - 状态方程 (gas) - 量热完全气体
//! - 数值格式 (schemes) - 预处理 Roe 一阶迎风耗散
//! - 引擎核心 (engine) - 节点累加器、并行边循环
//! - 收敛监测 (convergence)
//! - 流场输出 (output) - 导出量与 VTK
//!
//! # Trait 抽象
//!
//! - [`GeometryProvider`]: 边几何只读访问
//! - [`FluidStateProvider`]: 节点状态只读访问

pub mod convergence;
pub mod engine;
pub mod gas;
pub mod output;
pub mod schemes;
pub mod state;
pub mod traits;

// 重导出常用类型
pub use convergence::{ConvergenceMonitor, ConvergenceRecord};
pub use engine::{
    AtomicDissipationAccumulator, DissipationAccumulator, DissipationCalculator,
    DissipationComputeMetrics,
};
pub use gas::PerfectGas;
pub use output::{freestream_total_pressure, FlowfieldSnapshot, VtkWriter};
pub use schemes::{
    compute_dissipation, entropy_correction, EdgeContribution, Preconditioner, RoeDissipation,
};
pub use state::{ConservativeVars, DependentState, DependentVars, FlowField, FlowState};
pub use traits::{FluidStateProvider, GeometryProvider};
