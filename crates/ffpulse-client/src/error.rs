//! 协调层错误类型定义

use ffpulse_driver::DriverError;
use ffpulse_protocol::ProtocolError;
use ffpulse_shell::ShellError;
use ffpulse_waveform::WaveformError;
use thiserror::Error;

/// 协调层错误类型
///
/// 协议层错误（`NotConnected`、`MalformedResponse`）原样透传，不做任何重试。
#[derive(Error, Debug)]
pub enum FeedForwardError {
    /// 会话或寄存器访问错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 发送前的参数检查失败
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 输入波形不合法
    #[error("Waveform error: {0}")]
    Waveform(#[from] WaveformError),
}

pub type Result<T> = std::result::Result<T, FeedForwardError>;

impl FeedForwardError {
    /// 会话建立失败（网络、认证、超时）
    pub fn is_connect_error(&self) -> bool {
        matches!(self, FeedForwardError::Driver(e) if e.is_connect_error())
    }

    pub fn is_not_connected(&self) -> bool {
        matches!(
            self,
            FeedForwardError::Driver(DriverError::NotConnected)
                | FeedForwardError::Driver(DriverError::Shell(ShellError::Closed))
        )
    }

    pub fn is_malformed_response(&self) -> bool {
        match self {
            FeedForwardError::Driver(e) => e.is_malformed_response(),
            FeedForwardError::Protocol(ProtocolError::MalformedResponse { .. }) => true,
            _ => false,
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            FeedForwardError::Protocol(ProtocolError::OutOfRange { .. })
                | FeedForwardError::Driver(DriverError::Protocol(ProtocolError::OutOfRange { .. }))
        )
    }

    pub fn is_unsupported_shape(&self) -> bool {
        matches!(
            self,
            FeedForwardError::Waveform(WaveformError::UnsupportedShape { .. })
        )
    }

    /// 设备回显的原始文本（仅 `MalformedResponse`）
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            FeedForwardError::Driver(DriverError::Protocol(ProtocolError::MalformedResponse {
                raw,
            }))
            | FeedForwardError::Protocol(ProtocolError::MalformedResponse { raw }) => Some(raw),
            _ => None,
        }
    }
}
