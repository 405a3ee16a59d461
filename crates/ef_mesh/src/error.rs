// crates/ef_mesh/src/error.rs

//! 网格处理错误类型
//!
//! 所有错误可转换为 `ef_foundation::EfError` 向上传播

use ef_foundation::EfError;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 拓扑错误
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        /// 出错的操作
        operation: &'static str,
        /// 详细信息
        details: String,
    },

    /// 节点索引越界
    #[error("节点索引越界: {context} 引用节点 {index}, 节点总数 {len}")]
    NodeOutOfRange {
        /// 引用位置描述
        context: String,
        /// 越界索引
        index: usize,
        /// 节点总数
        len: usize,
    },

    /// 退化单元
    #[error("退化单元: 三角形 {element_id} 面积 {area:.3e}")]
    DegenerateElement {
        /// 单元编号
        element_id: usize,
        /// 有向面积
        area: f64,
    },

    /// 数组长度不匹配
    #[error("数组长度不匹配: {name} 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 数组名称
        name: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },
}

impl MeshError {
    /// 拓扑错误
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    /// 节点越界
    pub fn node_out_of_range(context: impl Into<String>, index: usize, len: usize) -> Self {
        Self::NodeOutOfRange {
            context: context.into(),
            index,
            len,
        }
    }
}

/// 转换到 Foundation 层错误
impl From<MeshError> for EfError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::NodeOutOfRange { index, len, .. } => {
                EfError::index_out_of_bounds("node", index, len)
            }
            MeshError::SizeMismatch {
                name,
                expected,
                actual,
            } => EfError::size_mismatch(name, expected, actual),
            other => EfError::invalid_mesh(other.to_string()),
        }
    }
}
