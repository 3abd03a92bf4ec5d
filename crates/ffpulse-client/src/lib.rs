//! # FFPulse Client - 前馈状态协调层
//!
//! 把寄存器协议（`ffpulse-driver`）和波形合成（`ffpulse-waveform`）组合成设备级操作：
//!
//! - 最大幅度、中心相位的设置与查询（两阶段写入，返回回读确认值）
//! - 脉冲窗口设置（偏移 0 替换为 0.03 µs）
//! - 任意幅度 / 相位波形上传（1-D 或带时间戳的 2-D）
//! - 单段线性斜坡
//! - 恢复默认波形
//!
//! # 使用示例
//!
//! ```no_run
//! use ffpulse_client::{DeviceProfile, FeedForward};
//! use ffpulse_driver::FramerConfig;
//! use ffpulse_shell::{Credential, ShellConfig};
//! use ffpulse_waveform::{PulseWindow, Waveform};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let shell = ShellConfig::new("192.168.0.109", "root", Credential::Password("secret".into()));
//! let mut ff = FeedForward::connect(&shell, FramerConfig::default(), DeviceProfile::default())?;
//!
//! let max = ff.set_max_amplitude(750.0)?;
//! println!("max amplitude: {}", max.confirmed);
//!
//! let wave = Waveform::uniform(vec![0.2, 0.5, 1.0, 0.5, 0.2])?;
//! ff.upload_amplitude(&wave, 750.0, PulseWindow::new(1.0, 10.0))?;
//! ff.close();
//! # Ok(())
//! # }
//! ```

mod error;
mod feed_forward;
pub mod profile;

pub use error::{FeedForwardError, Result};
pub use feed_forward::{FeedForward, RampReport, RampRequest, UploadReport};
pub use ffpulse_driver::Confirmed;
pub use profile::DeviceProfile;
