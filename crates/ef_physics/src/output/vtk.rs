// crates/ef_physics/src/output/vtk.rs

//! 旧版 ASCII VTK 导出器
//!
//! 写出三角形非结构网格与节点标量，用于 ParaView 可视化。
//! 文件名为 `<prefix><iter:05>.vtk`。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use ef_config::{OutputConfig, OutputField};
use ef_foundation::error::{EfError, EfResult};
use ef_mesh::EdgeMesh;

use super::flowfield::FlowfieldSnapshot;
use crate::engine::accumulator::DissipationAccumulator;

/// VTK 三角形单元类型
const VTK_TRIANGLE: u8 = 5;

/// VTK 导出器
#[derive(Debug, Clone)]
pub struct VtkWriter {
    directory: PathBuf,
    prefix: String,
    fields: Vec<OutputField>,
}

impl VtkWriter {
    /// 创建导出器
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, fields: Vec<OutputField>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            fields,
        }
    }

    /// 从输出配置创建
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.directory.clone(), config.prefix.clone(), config.fields.clone())
    }

    /// 输出字段列表
    pub fn fields(&self) -> &[OutputField] {
        &self.fields
    }

    /// 指定迭代步的文件路径
    pub fn file_path(&self, iter: usize) -> PathBuf {
        self.directory.join(format!("{}{:05}.vtk", self.prefix, iter))
    }

    /// 写出一帧
    ///
    /// # 参数
    /// - `iter`: 迭代步（用于文件名）
    /// - `mesh`: 网格
    /// - `snapshot`: 节点导出量
    /// - `dissipation`: 可选的耗散累加结果；字段列表含 `Dissipation` 时写出
    ///
    /// # 返回
    /// 写出的文件路径
    pub fn write(
        &self,
        iter: usize,
        mesh: &EdgeMesh,
        snapshot: &FlowfieldSnapshot,
        dissipation: Option<&DissipationAccumulator>,
    ) -> EfResult<PathBuf> {
        let n = mesh.nodes().len();
        if snapshot.n_nodes() != n {
            return Err(EfError::size_mismatch("snapshot", n, snapshot.n_nodes()));
        }
        if let Some(acc) = dissipation {
            if acc.n_nodes() != n {
                return Err(EfError::size_mismatch("dissipation", n, acc.n_nodes()));
            }
        }

        std::fs::create_dir_all(&self.directory).map_err(|e| {
            EfError::io_with_source(format!("无法创建输出目录: {}", self.directory.display()), e)
        })?;

        let path = self.file_path(iter);
        self.write_file(&path, mesh, snapshot, dissipation)
            .map_err(|e| EfError::io_with_source(format!("写入 VTK 失败: {}", path.display()), e))?;

        info!(path = %path.display(), n_nodes = n, "VTK 输出完成");
        Ok(path)
    }

    fn write_file(
        &self,
        path: &Path,
        mesh: &EdgeMesh,
        snapshot: &FlowfieldSnapshot,
        dissipation: Option<&DissipationAccumulator>,
    ) -> std::io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);

        writeln!(w, "# vtk DataFile Version 3.0")?;
        writeln!(w, "EdgeFlow flowfield")?;
        writeln!(w, "ASCII")?;
        writeln!(w, "DATASET UNSTRUCTURED_GRID")?;

        let nodes = mesh.nodes();
        writeln!(w, "POINTS {} float", nodes.len())?;
        for p in nodes {
            writeln!(w, "{:e} {:e} 0.0", p.x, p.y)?;
        }

        let triangles = mesh.triangles();
        writeln!(w, "CELLS {} {}", triangles.len(), 4 * triangles.len())?;
        for [a, b, c] in triangles {
            writeln!(w, "3 {} {} {}", a, b, c)?;
        }
        writeln!(w, "CELL_TYPES {}", triangles.len())?;
        for _ in triangles {
            writeln!(w, "{}", VTK_TRIANGLE)?;
        }

        writeln!(w, "POINT_DATA {}", nodes.len())?;
        for &field in &self.fields {
            if let Some(values) = snapshot.scalar(field) {
                write_scalars(&mut w, field.name(), values)?;
                continue;
            }
            match dissipation {
                Some(acc) => {
                    write_scalars(&mut w, "dissipation_dens", &acc.dens)?;
                    write_scalars(&mut w, "dissipation_xmom", &acc.xmom)?;
                    write_scalars(&mut w, "dissipation_ymom", &acc.ymom)?;
                    write_scalars(&mut w, "dissipation_ener", &acc.ener)?;
                }
                None => warn!(field = field.name(), "未提供耗散数据，跳过该字段"),
            }
        }

        w.flush()
    }
}

fn write_scalars<W: Write>(w: &mut W, name: &str, values: &[f64]) -> std::io::Result<()> {
    writeln!(w, "SCALARS {} float", name)?;
    writeln!(w, "LOOKUP_TABLE default")?;
    for v in values {
        writeln!(w, "{:e}", v)?;
    }
    Ok(())
}
