// apps/ef_cli/src/main.rs

//! EdgeFlow 命令行界面
//!
//! 在三角形网格上计算可压缩流动的预处理 Roe 迎风耗散。
//!
//! - `run`: 生成网格、初始化流场、执行耗散遍历并输出
//! - `validate`: 检查配置文件
//! - `info`: 显示默认配置和构建信息

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// EdgeFlow 边基迎风耗散命令行工具
#[derive(Parser)]
#[command(name = "ef_cli")]
#[command(author = "EdgeFlow Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Edge-based preconditioned Roe dissipation for compressible flow", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行耗散计算
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
