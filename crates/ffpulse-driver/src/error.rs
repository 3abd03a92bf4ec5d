//! 驱动层错误类型定义

use ffpulse_protocol::ProtocolError;
use ffpulse_shell::ShellError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 传输层错误（连接失败、IO、shell 关闭）
    #[error("Shell error: {0}")]
    Shell(#[from] ShellError),

    /// 协议错误（响应格式错误、值越界）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 没有可用的 shell（未连接或已关闭）
    #[error("Not connected")]
    NotConnected,
}

impl DriverError {
    /// 是否为连接建立失败
    pub fn is_connect_error(&self) -> bool {
        matches!(self, DriverError::Shell(ShellError::Connect(_)))
    }

    /// 是否为响应格式错误
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            DriverError::Protocol(ProtocolError::MalformedResponse { .. })
        )
    }
}
