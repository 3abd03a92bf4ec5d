//! # FFPulse CLI
//!
//! 前馈脉冲整形单元的命令行工具。
//!
//! ## One-shot 模式
//!
//! 每个设备命令独立完成 连接 → 操作 → 断开：
//!
//! ```bash
//! # 配置默认设备
//! ffpulse-cli config set --host 192.168.0.109 --user root
//!
//! # 设置最大幅度并回读确认
//! ffpulse-cli set-amp 750
//!
//! # 上传幅度波形（1-D 文件，窗口 1 µs + 10 µs）
//! ffpulse-cli upload-amp pulse.txt --scale 750 --offset 1 --duration 10
//!
//! # 离线预览合成结果
//! ffpulse-cli synth pulse.txt --offset 1 --duration 10 > table.csv
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod loader;
mod modes;
mod utils;

use commands::config::{CliConfig, config_file};
use commands::{
    ConfigCommand, GetCommand, Kind, RampCommand, SetAmpCommand, SetIntervalCommand,
    SetPhaseCommand, SynthCommand, UploadCommand,
};
use modes::oneshot::{ConnectArgs, OneShotMode};

/// FFPulse CLI - 前馈脉冲整形命令行工具
#[derive(Parser, Debug)]
#[command(name = "ffpulse-cli")]
#[command(
    about = "Command-line interface for the LLRF feed-forward pulse-shaping unit",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(long, global = true, env = "FFPULSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 查询最大幅度和脉冲窗口
    Get {
        #[command(flatten)]
        args: GetCommand,
    },

    /// 设置最大幅度
    SetAmp {
        #[command(flatten)]
        args: SetAmpCommand,
    },

    /// 设置脉冲窗口
    SetInterval {
        #[command(flatten)]
        args: SetIntervalCommand,
    },

    /// 设置中心相位
    SetPhase {
        #[command(flatten)]
        args: SetPhaseCommand,
    },

    /// 上传幅度波形
    UploadAmp {
        #[command(flatten)]
        args: UploadCommand,
    },

    /// 上传相位波形
    UploadPhase {
        #[command(flatten)]
        args: UploadCommand,
    },

    /// 上传线性斜坡
    Ramp {
        #[command(flatten)]
        args: RampCommand,
    },

    /// 恢复表标量默认值（幅度 1，相位 0）
    Restore {
        #[command(flatten)]
        connect: ConnectArgs,
    },

    /// 离线合成波形表（不连接设备）
    Synth {
        #[command(flatten)]
        args: SynthCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ffpulse_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = config_file(cli.config.as_deref())?;

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&path).await,

        Commands::Get { args } => {
            let mode = OneShotMode::new(&path).await?;
            args.execute(&mode).await
        },

        Commands::SetAmp { args } => {
            let mode = OneShotMode::new(&path).await?;
            args.execute(&mode).await
        },

        Commands::SetInterval { args } => {
            let mode = OneShotMode::new(&path).await?;
            args.execute(&mode).await
        },

        Commands::SetPhase { args } => {
            let mode = OneShotMode::new(&path).await?;
            args.execute(&mode).await
        },

        Commands::UploadAmp { args } => {
            let mode = OneShotMode::new(&path).await?;
            args.execute(Kind::Amp, &mode).await
        },

        Commands::UploadPhase { args } => {
            let mode = OneShotMode::new(&path).await?;
            args.execute(Kind::Phase, &mode).await
        },

        Commands::Ramp { args } => {
            let mode = OneShotMode::new(&path).await?;
            args.execute(&mode).await
        },

        Commands::Restore { connect } => {
            let mode = OneShotMode::new(&path).await?;
            mode.run(&connect, |device| Ok(device.restore_defaults()?)).await?;
            println!("✅ 已恢复表标量默认值");
            Ok(())
        },

        Commands::Synth { args } => {
            // 离线：只读取配置中的设备参数
            let config = CliConfig::load(&path)?;
            args.execute(&config.device).await
        },
    }
}
