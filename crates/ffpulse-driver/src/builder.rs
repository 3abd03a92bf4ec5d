//! Builder 模式实现
//!
//! 建立会话并完成引导：打开 shell（丢弃登录横幅）→ 将脉冲形状切换为 `Table` 模式。
//! `Table` 模式是所有波形表上传的前提。

use crate::client::RegisterClient;
use crate::error::DriverError;
use crate::framer::{FramerConfig, QuiescenceFramer};
use ffpulse_protocol::{PULSE_SHAPE_TABLE_MODE, RegisterMap};
use ffpulse_shell::ShellChannel;
#[cfg(feature = "ssh")]
use ffpulse_shell::{ShellConfig, SshShell};
use tracing::info;

/// 基于 SSH shell 的会话
#[cfg(feature = "ssh")]
pub type Session = RegisterClient<QuiescenceFramer<SshShell>>;

/// 会话 Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use ffpulse_driver::{FramerConfig, SessionBuilder};
/// use ffpulse_shell::{Credential, ShellConfig};
/// use std::time::Duration;
///
/// let shell = ShellConfig::new("192.168.0.109", "root", Credential::Password("secret".into()));
/// let session = SessionBuilder::new()
///     .framer_config(FramerConfig::default().idle_timeout(Duration::from_millis(300)))
///     .connect(&shell)
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    framer_config: FramerConfig,
    registers: RegisterMap,
    bootstrap: bool,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            framer_config: FramerConfig::default(),
            registers: RegisterMap::default(),
            bootstrap: true,
        }
    }

    /// 设置分帧配置（可选）
    pub fn framer_config(mut self, config: FramerConfig) -> Self {
        self.framer_config = config;
        self
    }

    /// 设置寄存器映射（可选，默认板卡 `kupvm1`）
    pub fn registers(mut self, registers: RegisterMap) -> Self {
        self.registers = registers;
        self
    }

    /// 跳过 `Table` 模式引导命令
    pub fn skip_bootstrap(mut self) -> Self {
        self.bootstrap = false;
        self
    }

    /// 通过 SSH 建立会话
    ///
    /// # Errors
    /// - `DriverError::Shell(ShellError::Connect)`: 网络、认证失败或超时
    #[cfg(feature = "ssh")]
    pub fn connect(&self, shell: &ShellConfig) -> Result<Session, DriverError> {
        let channel = SshShell::open(shell)?;
        self.attach(channel)
    }

    /// 在已打开的 shell 上建立会话
    pub fn attach<C: ShellChannel>(
        &self,
        channel: C,
    ) -> Result<RegisterClient<QuiescenceFramer<C>>, DriverError> {
        let mut client = RegisterClient::new(QuiescenceFramer::new(channel, self.framer_config));
        if self.bootstrap {
            client.write_literal(&self.registers.pulse_shape_mode, PULSE_SHAPE_TABLE_MODE)?;
            info!("Pulse shape mode set to {}", PULSE_SHAPE_TABLE_MODE);
        }
        Ok(client)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
