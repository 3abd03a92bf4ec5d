//! # 输入波形
//!
//! 波形来源提供两种形状：
//! - 1-D：`[N]`，隐含均匀时基
//! - 2-D：`[N, 2]`，每行 `(value, timestamp_us)`，时基可以不均匀
//!
//! 所有上传操作都必须同时支持这两种形状。

use crate::WaveformError;
use crate::normalize::{Normalized, SignalKind, normalize};
use crate::resample::{resample, resample_timed};
use crate::window::{PulseWindow, TableGeometry, apply_window};

/// 输入波形
#[derive(Debug, Clone, PartialEq)]
pub enum Waveform {
    /// 均匀时基
    Uniform(Vec<f64>),
    /// 带时间戳（微秒）
    Timed { values: Vec<f64>, times_us: Vec<f64> },
}

impl Waveform {
    /// 构造 1-D 波形
    ///
    /// # Errors
    /// - `WaveformError::Empty`: 没有采样
    /// - `WaveformError::NonFinite`: 存在 NaN 或无穷大
    pub fn uniform(samples: Vec<f64>) -> Result<Self, WaveformError> {
        check_finite(&samples)?;
        Ok(Waveform::Uniform(samples))
    }

    /// 由 `(value, timestamp_us)` 行构造 2-D 波形
    pub fn timed(rows: &[(f64, f64)]) -> Result<Self, WaveformError> {
        let (values, times_us): (Vec<f64>, Vec<f64>) = rows.iter().copied().unzip();
        check_finite(&values)?;
        check_finite(&times_us)?;
        if let Some(index) = times_us.windows(2).position(|w| w[1] < w[0]) {
            return Err(WaveformError::InvalidTimebase { index: index + 1 });
        }
        Ok(Waveform::Timed { values, times_us })
    }

    /// 由行优先的 n 维数组构造
    ///
    /// 支持 `[N]` 和 `[N, 2]`，其他形状返回 `UnsupportedShape`。
    pub fn from_shape(shape: &[usize], data: &[f64]) -> Result<Self, WaveformError> {
        let unsupported = || WaveformError::UnsupportedShape {
            shape: shape.to_vec(),
        };
        if shape.iter().product::<usize>() != data.len() {
            return Err(unsupported());
        }
        match shape {
            [_] => Self::uniform(data.to_vec()),
            [_, 2] => {
                let rows: Vec<(f64, f64)> = data.chunks_exact(2).map(|r| (r[0], r[1])).collect();
                Self::timed(&rows)
            },
            _ => Err(unsupported()),
        }
    }

    /// 数组的秩（1 或 2）
    pub fn rank(&self) -> usize {
        match self {
            Waveform::Uniform(_) => 1,
            Waveform::Timed { .. } => 2,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// 采样值（不含时间戳）
    pub fn values(&self) -> &[f64] {
        match self {
            Waveform::Uniform(samples) => samples,
            Waveform::Timed { values, .. } => values,
        }
    }

    /// 带时间戳波形的窗口 `[t_first, t_last]`
    pub fn window(&self) -> Option<PulseWindow> {
        match self {
            Waveform::Uniform(_) => None,
            Waveform::Timed { times_us, .. } => {
                let first = *times_us.first()?;
                let last = *times_us.last()?;
                Some(PulseWindow::from_span(first, last))
            },
        }
    }

    /// 归一化采样值，保留时基
    pub fn normalized(&self, kind: SignalKind) -> (Waveform, Option<f64>) {
        let Normalized {
            samples,
            implied_scale,
        } = normalize(self.values(), kind);
        let waveform = match self {
            Waveform::Uniform(_) => Waveform::Uniform(samples),
            Waveform::Timed { times_us, .. } => Waveform::Timed {
                values: samples,
                times_us: times_us.clone(),
            },
        };
        (waveform, implied_scale)
    }

    /// 按各自的时基重采样到 `target_len` 点
    pub fn resample(&self, target_len: usize) -> Vec<f64> {
        match self {
            Waveform::Uniform(samples) => resample(samples, target_len),
            Waveform::Timed { values, times_us } => resample_timed(values, times_us, target_len),
        }
    }

    /// 生成定长表：重采样到窗口内的点数，其余位置补零
    pub fn to_table(&self, window: &PulseWindow, geometry: &TableGeometry) -> Vec<f64> {
        let active = geometry.active_count(window.duration_us);
        apply_window(&self.resample(active), window, geometry)
    }
}

fn check_finite(samples: &[f64]) -> Result<(), WaveformError> {
    if samples.is_empty() {
        return Err(WaveformError::Empty);
    }
    match samples.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(WaveformError::NonFinite { index }),
        None => Ok(()),
    }
}
