//! # FFPulse Waveform - 波形合成流水线
//!
//! **依赖原则**: 只依赖 `ffpulse-protocol`，纯函数，无 I/O
//!
//! ## 流水线
//!
//! ```text
//! 任意长度输入 ──normalize──▶ 物理范围内 ──resample──▶ active_count 点
//!            ──apply_window──▶ 4096 点（窗口外为 0）──serialize──▶ 线格式文本
//! ```
//!
//! ## 包含模块
//!
//! - `waveform` - 输入形状（1-D 均匀时基 / 2-D 带时间戳）
//! - `normalize` - 幅度 [0,1] / 相位 [-180,180] 归一化
//! - `resample` - 线性插值重采样
//! - `window` - 脉冲窗口与定长表
//! - `ramp` - 线性斜坡表

pub mod normalize;
pub mod ramp;
pub mod resample;
pub mod waveform;
pub mod window;

// 重新导出常用类型
pub use normalize::{Normalized, SignalKind, normalize};
pub use ramp::{RampPoint, linear_ramp};
pub use resample::{resample, resample_timed};
pub use waveform::Waveform;
pub use window::{PulseWindow, TableGeometry, apply_window, synthesize};

/// 序列化为设备线格式（逗号分隔，6 位小数）
pub use ffpulse_protocol::serialize_table as serialize;

use thiserror::Error;

/// 波形错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaveformError {
    /// 采样数组的秩不是 1，或不是两列的 2-D 数组
    #[error("Unsupported waveform shape {shape:?}: expected [N] or [N, 2]")]
    UnsupportedShape { shape: Vec<usize> },

    #[error("Waveform has no samples")]
    Empty,

    #[error("Non-finite sample at index {index}")]
    NonFinite { index: usize },

    /// 时间戳不是单调非减
    #[error("Invalid timebase at index {index}: timestamps must be non-decreasing")]
    InvalidTimebase { index: usize },
}
