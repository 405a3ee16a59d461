// apps/ef_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 解析并验证配置文件，检查由配置生成的网格。

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use ef_config::SolverConfig;
use ef_mesh::RectMeshGenerator;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 同时生成网格并检查对偶面
    #[arg(long)]
    pub mesh: bool,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== EdgeFlow 配置验证 ===");
    println!("检查配置文件: {}", args.config.display());

    let config = match SolverConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            println!("  ✗ {}", e);
            bail!("验证失败：{}", e);
        }
    };
    println!("  ✓ 配置有效");
    println!(
        "  耗散: ε={}, β={}, 预处理={}",
        config.dissipation.entropy_fix_coeff,
        config.dissipation.dissipation_blend,
        config.dissipation.preconditioning.enabled
    );
    println!("  并行: {}", config.parallel.strategy.name());

    if !args.mesh {
        return Ok(());
    }

    let m = &config.mesh;
    let mesh = RectMeshGenerator::new(m.nx, m.ny, m.width, m.height)
        .build()
        .context("网格生成失败")?;
    let report = mesh.validate();
    println!("\n{}", report);

    for w in &report.warnings {
        warn!("{}", w);
    }

    if report.has_errors() || (args.strict && report.has_warnings()) {
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            report.error_count(),
            report.warning_count()
        );
    }

    println!("✓ 验证通过");
    Ok(())
}
