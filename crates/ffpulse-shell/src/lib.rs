//! # FFPulse Shell Transport
//!
//! 交互式 shell 传输层，提供统一的字节流抽象。
//!
//! 设备不提供结构化 API，所有寄存器访问都通过一个长期存在的交互式 shell 进行。
//! 本层只负责连接生命周期和原始字节 I/O，不关心响应边界
//! （响应分帧由 `ffpulse-driver` 的 Framer 负责）。

use bytes::Bytes;
use thiserror::Error;

#[cfg(feature = "ssh")]
pub mod ssh;

#[cfg(feature = "ssh")]
pub use ssh::{Credential, ShellConfig, SshShell};

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockReply, MockShell, SentLog};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum ShellError {
    /// 建立会话失败（网络、认证、超时）
    #[error("Connect error: {0}")]
    Connect(#[from] ConnectError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// 远端关闭了 shell（EOF）或本地已关闭
    #[error("Shell channel closed")]
    Closed,
}

/// 连接失败的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectErrorKind {
    /// 地址解析或 TCP 连接失败
    Network,
    /// 连接或握手超时
    Timeout,
    /// SSH 握手失败
    Handshake,
    /// 认证被拒绝
    Auth,
    /// 无法打开交互式 shell
    Channel,
}

/// 结构化连接错误
#[derive(Error, Debug, Clone)]
#[error("{host} ({kind:?}): {message}")]
pub struct ConnectError {
    pub host: String,
    pub kind: ConnectErrorKind,
    pub message: String,
}

impl ConnectError {
    pub fn new(
        host: impl Into<String>,
        kind: ConnectErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            kind,
            message: message.into(),
        }
    }
}

/// 交互式 shell 通道
///
/// 实现者持有一个已打开的 shell。所有方法都要求独占访问（`&mut self`），
/// 同一时刻只允许一条命令在途。
pub trait ShellChannel {
    /// 写入原始字节（阻塞直到全部写出）
    fn send(&mut self, bytes: &[u8]) -> Result<(), ShellError>;

    /// 非阻塞读取
    ///
    /// 有数据时返回 `Some`，当前没有可读数据时返回 `None`。
    fn try_receive(&mut self) -> Result<Option<Bytes>, ShellError>;

    /// 丢弃已缓冲但尚未消费的字节，返回丢弃的字节数
    fn drain(&mut self) -> Result<usize, ShellError> {
        let mut discarded = 0;
        while let Some(chunk) = self.try_receive()? {
            discarded += chunk.len();
        }
        Ok(discarded)
    }

    /// 关闭 shell，幂等
    fn close(&mut self) -> Result<(), ShellError>;
}

impl<T: ShellChannel + ?Sized> ShellChannel for Box<T> {
    fn send(&mut self, bytes: &[u8]) -> Result<(), ShellError> {
        (**self).send(bytes)
    }

    fn try_receive(&mut self) -> Result<Option<Bytes>, ShellError> {
        (**self).try_receive()
    }

    fn drain(&mut self) -> Result<usize, ShellError> {
        (**self).drain()
    }

    fn close(&mut self) -> Result<(), ShellError> {
        (**self).close()
    }
}
