//! 波形上传命令
//!
//! 1-D 文件使用 `--offset/--duration` 指定的窗口（默认整张表）；
//! 2-D 文件使用自身时间戳的范围；`--span` 显式指定 `[t_start, t_end]`。

use anyhow::Result;
use clap::{Args, ValueEnum};
use ffpulse_client::UploadReport;
use ffpulse_waveform::{PulseWindow, SignalKind};
use std::path::PathBuf;

use crate::commands::scalar::report;
use crate::loader::load_waveform;
use crate::modes::oneshot::{ConnectArgs, OneShotMode};

/// 波形类型
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// 幅度（[0,1] 为最大幅度的比例）
    Amp,
    /// 相位（度）
    Phase,
}

impl From<Kind> for SignalKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Amp => SignalKind::Amplitude,
            Kind::Phase => SignalKind::Phase,
        }
    }
}

/// 窗口参数
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// 偏移（微秒）
    #[arg(long, default_value_t = 0.0)]
    pub offset: f64,

    /// 持续时间（微秒）
    #[arg(long, default_value_t = 34.0)]
    pub duration: f64,

    /// 显式窗口 `[t_start, t_end]`（微秒）
    #[arg(long, num_args = 2, value_names = ["T_START", "T_END"], allow_hyphen_values = true)]
    pub span: Option<Vec<f64>>,
}

impl WindowArgs {
    pub fn window(&self) -> PulseWindow {
        PulseWindow::new(self.offset, self.duration)
    }

    pub fn span(&self) -> Option<(f64, f64)> {
        match self.span.as_deref() {
            Some([t_start, t_end]) => Some((*t_start, *t_end)),
            _ => None,
        }
    }
}

/// 上传命令参数
#[derive(Args, Debug)]
pub struct UploadCommand {
    /// 波形文件（一列或两列文本）
    pub file: PathBuf,

    /// 最大幅度（幅度波形）或中心相位（相位波形）
    #[arg(long, allow_hyphen_values = true)]
    pub scale: f64,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl UploadCommand {
    pub async fn execute(self, kind: Kind, mode: &OneShotMode) -> Result<()> {
        let waveform = load_waveform(&self.file)?;
        println!(
            "📂 已加载 {}-D 波形: {} 个采样",
            waveform.rank(),
            waveform.len()
        );

        let scale = self.scale;
        let window = self.window.window();
        let span = self.window.span();
        let result: UploadReport = mode
            .run(&self.connect, move |device| {
                let report = match (kind, span) {
                    (Kind::Amp, Some((t0, t1))) => {
                        device.upload_amplitude_span(&waveform, scale, t0, t1)?
                    },
                    (Kind::Amp, None) => device.upload_amplitude(&waveform, scale, window)?,
                    (Kind::Phase, Some((t0, t1))) => {
                        device.upload_phase_span(&waveform, scale, t0, t1)?
                    },
                    (Kind::Phase, None) => device.upload_phase(&waveform, scale, window)?,
                };
                Ok(report)
            })
            .await?;

        report(
            "偏移 (µs)",
            &ffpulse_client::Confirmed {
                requested: result.window.requested.offset_us,
                confirmed: result.window.confirmed.offset_us,
            },
        );
        report(
            "持续时间 (µs)",
            &ffpulse_client::Confirmed {
                requested: result.window.requested.duration_us,
                confirmed: result.window.confirmed.duration_us,
            },
        );
        let name = match kind {
            Kind::Amp => "最大幅度",
            Kind::Phase => "中心相位 (°)",
        };
        report(name, &result.scale);
        if result.rescaled {
            println!("⚠️  输入超出表的取值范围，已整体缩放");
        }
        println!("✅ 波形已上传（窗口内 {} 个采样）", result.active_samples);
        Ok(())
    }
}
