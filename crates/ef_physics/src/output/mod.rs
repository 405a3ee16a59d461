// crates/ef_physics/src/output/mod.rs

//! 流场输出
//!
//! - [`flowfield`]: 节点导出量（马赫数、总压、总温等）
//! - [`vtk`]: 旧版 ASCII VTK 写出

pub mod flowfield;
pub mod vtk;

pub use flowfield::{freestream_total_pressure, FlowfieldSnapshot};
pub use vtk::VtkWriter;
