// crates/ef_physics/src/schemes/roe/mod.rs

//! 预处理 Roe 迎风耗散
//!
//! 每条边上：
//!
//! 1. 取两端节点状态，构造 Roe 平均
//! 2. 计算预处理参数 θ 与特征矩阵 Γ·R 和 R⁻¹·M⁻¹
//! 3. 对特征值做熵修正，得到阻尼幅值
//! 4. 守恒跳跃投影到特征方向、缩放、再投影回守恒变量
//! 5. 乘以 ds·β/2，+flux 加到 i，-flux 加到 j
//!
//! # 使用示例
//!
//! ```
//! use ef_config::DissipationConfig;
//! use ef_mesh::RectMeshGenerator;
//! use ef_physics::{DissipationAccumulator, FlowField, FlowState, PerfectGas};
//! use ef_physics::schemes::compute_dissipation;
//!
//! let mesh = RectMeshGenerator::square(4, 1.0).build().unwrap();
//! let gas = PerfectGas::default();
//! let cv = gas.conservative_from_primitive(1.0, 0.5, 0.0, 1.0 / 1.4);
//! let state = FlowState::uniform(25, cv);
//! let field = FlowField::new(state.clone(), gas.update_dependent(&state)).unwrap();
//!
//! let mut diss = DissipationAccumulator::new(25);
//! compute_dissipation(&mesh, &field, &DissipationConfig::default(), &mut diss).unwrap();
//! assert!(diss.max_abs() < 1e-12);
//! ```

mod average;
mod dissipation;
mod entropy;
mod precond;

pub use average::RoeAverage;
pub use dissipation::{compute_dissipation, EdgeContribution, RoeDissipation};
pub(crate) use dissipation::check_sizes;
pub use entropy::entropy_correction;
pub use precond::{matvec_prod5, CharacteristicState, PrecondEigenvalues, Preconditioner};
