//! 响应分帧
//!
//! 远端 shell 没有终止符、长度前缀或请求 ID，一条命令的响应只能靠"静默"判断结束：
//! 在配置的空闲窗口内没有新字节到达，就认为响应已完整。
//!
//! 这是启发式而不是协议保证：
//! - 设备响应过慢会被截断（剩余字节在下一条命令前被当作旧输出丢弃）
//! - 设备过于频繁地输出会把两次响应合并
//!
//! 空闲窗口因此必须可配置。[`Framer`] trait 允许将来替换为按行或按长度分帧的传输，
//! 而不影响 `RegisterClient` 和上层。

use crate::error::DriverError;
use ffpulse_shell::{ShellChannel, ShellError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// 日志中命令文本的最大预览长度（波形表命令有数万字符）
const LOG_PREVIEW_LEN: usize = 120;

/// 命令/响应分帧器
///
/// 一次 `exchange` 就是一条命令的完整往返。实现者必须保证同一时刻只有一条命令在途。
pub trait Framer {
    /// 发送一行命令（不含换行符），返回去除首尾空白后的完整响应文本
    ///
    /// # Errors
    /// - `DriverError::NotConnected`: 没有可用的 shell
    /// - `DriverError::Shell`: 底层 IO 失败
    fn exchange(&mut self, line: &str) -> Result<String, DriverError>;

    /// 是否仍持有可用的 shell
    fn is_connected(&self) -> bool;

    /// 释放 shell，幂等且不会失败
    fn close(&mut self);
}

impl<F: Framer + ?Sized> Framer for Box<F> {
    fn exchange(&mut self, line: &str) -> Result<String, DriverError> {
        (**self).exchange(line)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// 分帧配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramerConfig {
    /// 空闲窗口：超过此时间没有新字节即认为响应结束
    pub idle_timeout: Duration,
    /// 没有数据时的轮询间隔
    pub poll_interval: Duration,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl FramerConfig {
    pub fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// 基于静默的分帧器
///
/// 每次 `exchange`：
/// 1. 丢弃通道中已缓冲的旧输出（防止上一次交互的残留混入本次响应）
/// 2. 写入命令行
/// 3. 循环读取：有新字节就追加并重置空闲计时；没有就短暂休眠并检查计时
/// 4. 空闲超过 `idle_timeout` 后返回去除首尾空白的缓冲区
///
/// 一旦命令写出就无法取消，只能关闭并重建会话。
pub struct QuiescenceFramer<C: ShellChannel> {
    channel: Option<C>,
    config: FramerConfig,
}

impl<C: ShellChannel> QuiescenceFramer<C> {
    pub fn new(channel: C, config: FramerConfig) -> Self {
        Self {
            channel: Some(channel),
            config,
        }
    }

    pub fn config(&self) -> &FramerConfig {
        &self.config
    }

    fn read_until_idle(channel: &mut C, config: &FramerConfig) -> Result<Vec<u8>, ShellError> {
        let mut buffer = Vec::new();
        let mut last_activity = Instant::now();
        loop {
            match channel.try_receive()? {
                Some(chunk) => {
                    trace!("Received {} bytes", chunk.len());
                    buffer.extend_from_slice(&chunk);
                    last_activity = Instant::now();
                },
                None => {
                    if last_activity.elapsed() > config.idle_timeout {
                        return Ok(buffer);
                    }
                    std::thread::sleep(config.poll_interval);
                },
            }
        }
    }
}

impl<C: ShellChannel> Framer for QuiescenceFramer<C> {
    fn exchange(&mut self, line: &str) -> Result<String, DriverError> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;

        let result = (|| {
            let discarded = channel.drain()?;
            if discarded > 0 {
                debug!("Discarded {} stale bytes before command", discarded);
            }

            debug!("-> {}", preview(line));
            let mut framed = String::with_capacity(line.len() + 1);
            framed.push_str(line);
            framed.push('\n');
            channel.send(framed.as_bytes())?;

            Self::read_until_idle(channel, &self.config)
        })();

        match result {
            Ok(buffer) => {
                let response = String::from_utf8_lossy(&buffer).trim().to_string();
                debug!("<- {}", preview(&response));
                Ok(response)
            },
            Err(ShellError::Closed) => {
                // 远端已关闭，后续调用快速失败
                self.close();
                Err(DriverError::Shell(ShellError::Closed))
            },
            Err(e) => Err(e.into()),
        }
    }

    fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close() {
                debug!("Ignoring error while closing shell: {}", e);
            }
        }
    }
}

impl<C: ShellChannel> Drop for QuiescenceFramer<C> {
    fn drop(&mut self) {
        self.close();
    }
}

fn preview(text: &str) -> String {
    if text.len() <= LOG_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = LOG_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &text[..end], text.len())
}
