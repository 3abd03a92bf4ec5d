//! One-shot 模式
//!
//! 每个命令独立执行：
//! 1. 读取配置
//! 2. 连接设备（SSH + `Table` 模式引导）
//! 3. 执行操作
//! 4. 断开连接
//!
//! 协议调用是同步阻塞的，整个会话在 `spawn_blocking` 工作线程中运行；
//! 协调器的日志行通过通道转发到终端。

use anyhow::{Context, Result};
use clap::Args;
use ffpulse_client::{DeviceProfile, FeedForward};
use ffpulse_driver::{FramerConfig, QuiescenceFramer};
use ffpulse_shell::{Credential, ShellConfig, SshShell};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::commands::config::CliConfig;
use crate::utils;

/// SSH 会话上的协调器
pub type Device = FeedForward<QuiescenceFramer<SshShell>>;

/// 连接参数（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectArgs {
    /// 设备主机名或 IP
    #[arg(long)]
    pub host: Option<String>,

    /// SSH 用户名
    #[arg(short, long)]
    pub user: Option<String>,

    /// SSH 端口
    #[arg(long)]
    pub port: Option<u16>,

    /// SSH 密码（未提供时交互输入）
    #[arg(long, env = "FFPULSE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// 私钥文件
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    /// 使用 ssh-agent 认证
    #[arg(long)]
    pub agent: bool,

    /// 板卡名（覆盖配置）
    #[arg(long)]
    pub board: Option<String>,

    /// 响应静默阈值（毫秒）
    #[arg(long)]
    pub idle_ms: Option<u64>,
}

/// One-shot 模式配置
#[derive(Debug, Clone)]
pub struct OneShotConfig {
    pub shell: ShellConfig,
    pub framer: FramerConfig,
    pub profile: DeviceProfile,
}

impl OneShotConfig {
    /// 合并命令行参数和配置文件（命令行参数优先）
    pub fn resolve(args: &ConnectArgs, config: &CliConfig) -> Result<Self> {
        let host = args
            .host
            .clone()
            .or_else(|| config.host.clone())
            .context("未指定设备主机，请使用 --host 或 `ffpulse-cli config set --host`")?;
        let user = args
            .user
            .clone()
            .or_else(|| config.user.clone())
            .unwrap_or_else(|| "root".to_string());

        let credential = if args.agent {
            Credential::Agent
        } else if let Some(path) = args.key_file.clone().or_else(|| config.key_file.clone()) {
            Credential::KeyFile {
                path,
                passphrase: args.password.clone(),
            }
        } else if let Some(password) = args.password.clone() {
            Credential::Password(password)
        } else {
            Credential::Password(utils::prompt_password(&user, &host)?)
        };

        let mut shell = ShellConfig::new(host, user, credential);
        if let Some(port) = args.port.or(config.port) {
            shell = shell.port(port);
        }

        let mut framer = FramerConfig::default();
        if let Some(ms) = args.idle_ms.or(config.idle_timeout_ms) {
            framer = framer.idle_timeout(Duration::from_millis(ms));
        }

        let mut profile = config.device.clone();
        if let Some(board) = &args.board {
            profile.board = board.clone();
        }

        Ok(Self {
            shell,
            framer,
            profile,
        })
    }
}

/// One-shot 模式
pub struct OneShotMode {
    config: CliConfig,
}

impl OneShotMode {
    /// 加载配置文件
    pub async fn new(config_path: &std::path::Path) -> Result<Self> {
        let config = CliConfig::load(config_path)?;
        Ok(Self { config })
    }

    /// 连接设备，在工作线程中执行 `op`，最后关闭会话
    pub async fn run<T, Op>(&self, args: &ConnectArgs, op: Op) -> Result<T>
    where
        T: Send + 'static,
        Op: FnOnce(&mut Device) -> Result<T> + Send + 'static,
    {
        let resolved = OneShotConfig::resolve(args, &self.config)?;
        info!(
            "Connecting to {}@{}:{} (board {})",
            resolved.shell.user, resolved.shell.host, resolved.shell.port, resolved.profile.board
        );
        println!("⏳ 连接到 {}...", resolved.shell.host);

        let (tx, rx) = crossbeam_channel::unbounded::<String>();
        let printer = std::thread::spawn(move || {
            for line in rx {
                println!("  {}", line);
            }
        });

        let result = tokio::task::spawn_blocking(move || -> Result<T> {
            let mut device = Device::connect(&resolved.shell, resolved.framer, resolved.profile)
                .context("连接设备失败")?
                .with_log_sink(tx);
            println!("✅ 已连接");

            let output = op(&mut device);
            if let Err(e) = &output {
                warn!("Operation failed: {:#}", e);
            }
            device.close();
            info!("Session closed");
            output
        })
        .await
        .context("工作线程异常退出")?;

        // 协调器释放后通道关闭，打印线程随之结束
        let _ = printer.join();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ConnectArgs {
        ConnectArgs {
            password: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_requires_host() {
        let err = OneShotConfig::resolve(&args(), &CliConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--host"));
    }

    #[test]
    fn test_resolve_args_override_config() {
        let config = CliConfig {
            host: Some("from-config".to_string()),
            user: Some("operator".to_string()),
            port: Some(2022),
            idle_timeout_ms: Some(800),
            ..Default::default()
        };
        let args = ConnectArgs {
            host: Some("from-args".to_string()),
            board: Some("kupvm2".to_string()),
            idle_ms: Some(250),
            ..args()
        };

        let resolved = OneShotConfig::resolve(&args, &config).unwrap();
        assert_eq!(resolved.shell.host, "from-args");
        assert_eq!(resolved.shell.user, "operator");
        assert_eq!(resolved.shell.port, 2022);
        assert_eq!(resolved.framer.idle_timeout, Duration::from_millis(250));
        assert_eq!(resolved.profile.board, "kupvm2");
        assert!(matches!(resolved.shell.credential, Credential::Password(ref p) if p == "secret"));
    }

    #[test]
    fn test_resolve_credential_priority() {
        let config = CliConfig {
            host: Some("llrf".to_string()),
            key_file: Some(PathBuf::from("/home/op/.ssh/id_ed25519")),
            ..Default::default()
        };

        let resolved = OneShotConfig::resolve(&args(), &config).unwrap();
        assert!(matches!(resolved.shell.credential, Credential::KeyFile { .. }));

        let agent = ConnectArgs {
            agent: true,
            ..args()
        };
        let resolved = OneShotConfig::resolve(&agent, &config).unwrap();
        assert!(matches!(resolved.shell.credential, Credential::Agent));
    }
}
