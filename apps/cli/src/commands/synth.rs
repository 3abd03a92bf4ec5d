//! 离线合成预览
//!
//! 不连接设备，对波形文件执行归一化、重采样和窗口化，把结果写到标准输出。
//! 摘要信息写到标准错误，标准输出可以直接重定向成文件。

use anyhow::Result;
use clap::{Args, ValueEnum};
use ffpulse_client::DeviceProfile;
use ffpulse_waveform::{PulseWindow, SignalKind, serialize};
use std::path::PathBuf;

use crate::commands::upload::{Kind, WindowArgs};
use crate::loader::load_waveform;

/// 输出格式
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// 设备线格式（逗号分隔，6 位小数）
    Csv,
    /// JSON（含摘要）
    Json,
}

/// 合成预览参数
#[derive(Args, Debug)]
pub struct SynthCommand {
    /// 波形文件（一列或两列文本）
    pub file: PathBuf,

    /// 波形类型
    #[arg(long, value_enum, default_value_t = Kind::Amp)]
    pub kind: Kind,

    #[command(flatten)]
    pub window: WindowArgs,

    /// 输出格式
    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,
}

/// 合成结果
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Synthesis {
    pub offset_us: f64,
    pub duration_us: f64,
    pub active_samples: usize,
    pub implied_scale: Option<f64>,
    pub table: Vec<f64>,
}

impl SynthCommand {
    pub fn synthesize(&self, profile: &DeviceProfile) -> Result<Synthesis> {
        let waveform = load_waveform(&self.file)?;
        let window = match self.window.span() {
            Some((t_start, t_end)) => PulseWindow::from_span(t_start, t_end),
            None => waveform.window().unwrap_or(self.window.window()),
        };
        if window.offset_us < 0.0 || window.duration_us < 0.0 {
            anyhow::bail!(
                "窗口无效: 偏移 {} µs，持续时间 {} µs",
                window.offset_us,
                window.duration_us
            );
        }

        let geometry = profile.geometry();
        let (normalized, implied_scale) = waveform.normalized(SignalKind::from(self.kind));
        let table = normalized.to_table(&window, &geometry);

        Ok(Synthesis {
            offset_us: profile.coerce_offset(window.offset_us),
            duration_us: window.duration_us,
            active_samples: geometry.active_count(window.duration_us),
            implied_scale,
            table,
        })
    }

    pub async fn execute(self, profile: &DeviceProfile) -> Result<()> {
        let synthesis = self.synthesize(profile)?;

        eprintln!(
            "窗口: {} µs + {} µs，窗口内 {} / {} 个采样",
            synthesis.offset_us,
            synthesis.duration_us,
            synthesis.active_samples,
            synthesis.table.len()
        );
        if synthesis.duration_us > profile.max_pulse_us {
            eprintln!("⚠️  持续时间超过 {} µs，超出部分被截断", profile.max_pulse_us);
        }
        if let Some(scale) = synthesis.implied_scale {
            eprintln!("⚠️  输入超出取值范围，已整体缩放，隐含标量 {}", scale);
        }

        match self.format {
            Format::Csv => println!("{}", serialize(&synthesis.table)),
            Format::Json => println!("{}", serde_json::to_string(&synthesis)?),
        }
        Ok(())
    }
}
