// apps/ef_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示构建信息和默认配置。

use anyhow::{Context, Result};
use clap::Args;
use ef_config::{ParallelStrategy, SolverConfig};
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 显示系统信息
    #[arg(long)]
    pub system: bool,

    /// 显示默认配置（JSON）
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== EdgeFlow 信息 ===");

    let all = !args.system && !args.defaults;
    if args.system || all {
        print_system_info();
    }
    if all {
        println!();
    }
    if args.defaults || all {
        print_default_config()?;
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("EdgeFlow CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!(
        "可用线程: {}",
        std::thread::available_parallelism().map_or(1, |n| n.get())
    );

    println!("\n并行策略:");
    for strategy in [
        ParallelStrategy::Sequential,
        ParallelStrategy::Colored,
        ParallelStrategy::PrivateReduce,
        ParallelStrategy::Atomic,
        ParallelStrategy::Auto,
    ] {
        println!("  - {}", strategy.name());
    }
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    let config = SolverConfig::default();
    let json = serde_json::to_string_pretty(&config).context("无法序列化默认配置")?;
    println!("{}", json);
    Ok(())
}
