//! # 归一化
//!
//! 幅度表的取值是最大幅度寄存器的比例（[0,1]），相位表的取值是度（[-180,180]）。
//! 超出范围的输入被整体线性缩放到范围内，同时报告隐含的缩放值，
//! 调用方据此在上传波形表之前更新对应的标量寄存器。

use ffpulse_protocol::PHASE_LIMIT_DEG;

/// 信号类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// 幅度，表值范围 [0, 1]
    Amplitude,
    /// 相位（度），表值范围 [-180, 180]
    Phase,
}

impl SignalKind {
    /// 表值的合法范围
    pub fn range(self) -> (f64, f64) {
        match self {
            SignalKind::Amplitude => (0.0, 1.0),
            SignalKind::Phase => (-PHASE_LIMIT_DEG, PHASE_LIMIT_DEG),
        }
    }

    /// 信号是否整体落在合法范围内
    pub fn contains(self, signal: &[f64]) -> bool {
        let (lo, hi) = self.range();
        signal.iter().all(|&s| s >= lo && s <= hi)
    }
}

/// 归一化结果
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// 落在合法范围内的信号
    pub samples: Vec<f64>,
    /// 发生缩放时隐含的标量值
    ///
    /// - 幅度：缩放前的最大值（新的最大幅度）
    /// - 相位：`(max - min) / 2`（新的中心相位）
    ///
    /// 输入已在范围内时为 `None`。
    pub implied_scale: Option<f64>,
}

impl Normalized {
    /// 隐含的标量值，未发生缩放时使用调用方的值
    pub fn scale_or(&self, caller: f64) -> f64 {
        self.implied_scale.unwrap_or(caller)
    }

    pub fn was_rescaled(&self) -> bool {
        self.implied_scale.is_some()
    }
}

/// 将信号归一化到 `kind` 的合法范围
///
/// 已在范围内的信号原样返回。
pub fn normalize(signal: &[f64], kind: SignalKind) -> Normalized {
    if signal.is_empty() || kind.contains(signal) {
        return Normalized {
            samples: signal.to_vec(),
            implied_scale: None,
        };
    }

    let (min, max) = min_max(signal);
    match kind {
        SignalKind::Amplitude => {
            let span = max - min;
            let samples = if span > 0.0 {
                signal.iter().map(|&s| (s - min) / span).collect()
            } else {
                // 常数信号：整段都处于峰值
                vec![1.0; signal.len()]
            };
            Normalized {
                samples,
                implied_scale: Some(max),
            }
        },
        SignalKind::Phase => {
            let half_span = (max - min) / 2.0;
            let mid = (max + min) / 2.0;
            let samples = if half_span > 0.0 {
                signal
                    .iter()
                    .map(|&s| {
                        ((s - mid) / half_span * PHASE_LIMIT_DEG)
                            .clamp(-PHASE_LIMIT_DEG, PHASE_LIMIT_DEG)
                    })
                    .collect()
            } else {
                vec![0.0; signal.len()]
            };
            Normalized {
                samples,
                implied_scale: Some(half_span),
            }
        },
    }
}

fn min_max(signal: &[f64]) -> (f64, f64) {
    signal
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        })
}
