//! 寄存器协议客户端
//!
//! 在 [`Framer`] 之上提供三个原语：
//! - `write_scalar`：`access <path>=<value>`，不确认结果
//! - `read_scalar`：`dump <path>`，解析回显中的数值
//! - `write_table`：整张波形表作为一条 `access` 命令发送
//!
//! 设备不返回结构化应答，写入后回读是唯一的验证手段。
//! 需要向调用方报告结果的写操作都走两阶段流程：
//! [`RegisterClient::write_intent`] 写出，再用 [`PendingWrite::verify`] 回读确认。

use crate::error::DriverError;
use crate::framer::Framer;
use ffpulse_protocol::{Command, RegisterPath, parse_scalar};
use tracing::{debug, info, warn};

/// 回读确认后的值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confirmed<T> {
    /// 调用方请求的值（经过强制修正后实际发送的值）
    pub requested: T,
    /// 设备回读的值
    pub confirmed: T,
}

impl<T: PartialEq> Confirmed<T> {
    /// 设备是否原样接受了请求值
    pub fn is_exact(&self) -> bool {
        self.requested == self.confirmed
    }
}

/// 已写出、尚未回读确认的标量写入
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a pending write is unverified until `verify` is called"]
pub struct PendingWrite {
    path: RegisterPath,
    requested: f64,
}

impl PendingWrite {
    pub fn path(&self) -> &RegisterPath {
        &self.path
    }

    pub fn requested(&self) -> f64 {
        self.requested
    }

    /// 回读寄存器，返回确认值
    pub fn verify<F: Framer>(
        self,
        client: &mut RegisterClient<F>,
    ) -> Result<Confirmed<f64>, DriverError> {
        let confirmed = client.read_scalar(&self.path)?;
        if confirmed != self.requested {
            warn!(
                "{} read back {} (requested {})",
                self.path, confirmed, self.requested
            );
        } else {
            info!("{} = {}", self.path, confirmed);
        }
        Ok(Confirmed {
            requested: self.requested,
            confirmed,
        })
    }
}

/// 寄存器协议客户端
///
/// 独占持有分帧器；所有方法需要 `&mut self`，保证同一会话上只有一条命令在途。
pub struct RegisterClient<F: Framer> {
    framer: F,
}

impl<F: Framer> RegisterClient<F> {
    pub fn new(framer: F) -> Self {
        Self { framer }
    }

    /// 写标量寄存器（不确认）
    pub fn write_scalar(&mut self, path: &RegisterPath, value: f64) -> Result<(), DriverError> {
        self.send(&Command::write_scalar(path, value)).map(|_| ())
    }

    /// 写枚举型寄存器的字面值（不确认）
    pub fn write_literal(&mut self, path: &RegisterPath, literal: &str) -> Result<(), DriverError> {
        self.send(&Command::write_literal(path, literal)).map(|_| ())
    }

    /// 读标量寄存器
    ///
    /// # Errors
    /// - `DriverError::Protocol(MalformedResponse)`: 回显中没有可解析的数值
    pub fn read_scalar(&mut self, path: &RegisterPath) -> Result<f64, DriverError> {
        let response = self.send(&Command::read(path))?;
        Ok(parse_scalar(&response, path)?)
    }

    /// 写波形表（逗号分隔、6 位小数，单条命令）
    ///
    /// 不在客户端限制长度。4096 点约 37 KB，经交互式 PTY 发送时可能超过
    /// 设备端终端的单行上限（规范模式下通常为 4095 字节）。
    pub fn write_table(&mut self, path: &RegisterPath, samples: &[f64]) -> Result<(), DriverError> {
        debug!("Writing {} samples to {}", samples.len(), path);
        self.send(&Command::write_table(path, samples)).map(|_| ())
    }

    /// 两阶段写入的第一阶段：写出值，返回待确认的写入
    pub fn write_intent(
        &mut self,
        path: &RegisterPath,
        value: f64,
    ) -> Result<PendingWrite, DriverError> {
        self.write_scalar(path, value)?;
        Ok(PendingWrite {
            path: path.clone(),
            requested: value,
        })
    }

    /// 写入并立即回读确认
    pub fn set_scalar(
        &mut self,
        path: &RegisterPath,
        value: f64,
    ) -> Result<Confirmed<f64>, DriverError> {
        self.write_intent(path, value)?.verify(self)
    }

    pub fn is_connected(&self) -> bool {
        self.framer.is_connected()
    }

    /// 关闭会话，幂等
    pub fn close(&mut self) {
        self.framer.close();
    }

    /// 访问底层分帧器
    pub fn framer(&self) -> &F {
        &self.framer
    }

    pub fn framer_mut(&mut self) -> &mut F {
        &mut self.framer
    }

    fn send(&mut self, command: &Command) -> Result<String, DriverError> {
        self.framer.exchange(&command.to_line())
    }
}
