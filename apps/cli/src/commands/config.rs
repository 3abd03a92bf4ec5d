//! 配置管理命令
//!
//! 配置文件默认位于 `<config_dir>/ffpulse/config.toml`，可用 `--config` 或
//! `FFPULSE_CONFIG` 覆盖。密码从不写入配置文件。

use anyhow::{Context, Result};
use clap::Subcommand;
use ffpulse_client::DeviceProfile;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("ffpulse");
    path.push("config.toml");
    Ok(path)
}

/// 解析配置文件路径（命令行参数优先）
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_file(),
    }
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 设备主机名或 IP
    pub host: Option<String>,

    /// SSH 用户名
    pub user: Option<String>,

    /// SSH 端口
    pub port: Option<u16>,

    /// 私钥文件（设置后优先于密码）
    pub key_file: Option<PathBuf>,

    /// 响应静默阈值（毫秒）
    pub idle_timeout_ms: Option<u64>,

    /// 设备参数
    pub device: DeviceProfile,
}

impl CliConfig {
    /// 加载配置，文件不存在时返回默认配置
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 保存配置
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("创建配置目录失败")?;
        }

        let body = toml::to_string_pretty(self).context("序列化配置失败")?;
        let content = format!("# FFPulse CLI Configuration\n\n{}", body);
        fs::write(path, content).context("写入配置文件失败")?;
        Ok(())
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 设备主机名或 IP
        #[arg(long)]
        host: Option<String>,

        /// SSH 用户名
        #[arg(long)]
        user: Option<String>,

        /// SSH 端口
        #[arg(long)]
        port: Option<u16>,

        /// 私钥文件
        #[arg(long)]
        key_file: Option<PathBuf>,

        /// 板卡名（如 kupvm1）
        #[arg(long)]
        board: Option<String>,

        /// 响应静默阈值（毫秒）
        #[arg(long)]
        idle_ms: Option<u64>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub async fn execute(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Set {
                host,
                user,
                port,
                key_file,
                board,
                idle_ms,
            } => {
                let mut config = CliConfig::load(path)?;

                if let Some(host) = host {
                    println!("✅ 设置主机: {}", host);
                    config.host = Some(host);
                }
                if let Some(user) = user {
                    println!("✅ 设置用户: {}", user);
                    config.user = Some(user);
                }
                if let Some(port) = port {
                    println!("✅ 设置端口: {}", port);
                    config.port = Some(port);
                }
                if let Some(key_file) = key_file {
                    println!("✅ 设置私钥文件: {}", key_file.display());
                    config.key_file = Some(key_file);
                }
                if let Some(board) = board {
                    println!("✅ 设置板卡: {}", board);
                    config.device.board = board;
                }
                if let Some(idle_ms) = idle_ms {
                    println!("✅ 设置静默阈值: {} ms", idle_ms);
                    config.idle_timeout_ms = Some(idle_ms);
                }

                config.save(path)
            },

            ConfigCommand::Get { key } => {
                let config = CliConfig::load(path)?;
                let unset = || "(未设置)".to_string();

                match key.as_str() {
                    "host" => println!("{}", config.host.unwrap_or_else(unset)),
                    "user" => println!("{}", config.user.unwrap_or_else(unset)),
                    "port" => println!(
                        "{}",
                        config.port.map(|p| p.to_string()).unwrap_or_else(unset)
                    ),
                    "key_file" => println!(
                        "{}",
                        config.key_file.map(|p| p.display().to_string()).unwrap_or_else(unset)
                    ),
                    "board" => println!("{}", config.device.board),
                    "idle_ms" => println!(
                        "{}",
                        config.idle_timeout_ms.map(|v| v.to_string()).unwrap_or_else(unset)
                    ),
                    _ => print_config(&config),
                }
                Ok(())
            },

            ConfigCommand::Check => {
                let config = CliConfig::load(path)?;
                println!("配置文件: {}", path.display());
                print_config(&config);

                if config.host.is_none() {
                    println!("⚠️  未设置主机，设备命令需要 --host");
                }
                if config.device.max_pulse_us <= 0.0 || config.device.table_len == 0 {
                    anyhow::bail!("设备参数无效: {:?}", config.device);
                }
                println!("✅ 配置有效");
                Ok(())
            },
        }
    }
}

fn print_config(config: &CliConfig) {
    println!("FFPulse CLI 配置:");
    println!("  主机: {:?}", config.host);
    println!("  用户: {:?}", config.user);
    println!("  端口: {:?}", config.port);
    println!("  私钥: {:?}", config.key_file);
    println!("  静默阈值: {:?} ms", config.idle_timeout_ms);
    println!("  板卡: {}", config.device.board);
    println!(
        "  表长度: {}，脉冲上限: {} µs，最小偏移: {} µs，相位保护带: ±{}°",
        config.device.table_len,
        config.device.max_pulse_us,
        config.device.min_offset_us,
        config.device.phase_guard_deg
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.device.board, "kupvm1");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CliConfig {
            host: Some("192.168.0.109".to_string()),
            user: Some("root".to_string()),
            idle_timeout_ms: Some(300),
            ..Default::default()
        };
        config.device.board = "kupvm2".to_string();
        config.save(&path).unwrap();

        let loaded = CliConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "host = \"llrf\"\n\n[device]\nmax_pulse_us = 30.0\n").unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.host.as_deref(), Some("llrf"));
        assert_eq!(config.device.max_pulse_us, 30.0);
        assert_eq!(config.device.min_offset_us, 0.03);
        assert_eq!(config.device.table_len, 4096);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "host = [").unwrap();
        assert!(CliConfig::load(&path).is_err());
    }
}
