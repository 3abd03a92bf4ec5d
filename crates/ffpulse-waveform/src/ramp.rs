//! # 线性斜坡
//!
//! 第 `i` 个表采样对应时刻 `offset + i * sample_period`。
//! 落在 `[t_start, t_end]` 且位于窗口内的采样取直线上的值，其余为 0。

use crate::window::{PulseWindow, TableGeometry};

/// 斜坡端点（时间为微秒，幅度为归一化值）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampPoint {
    pub t_us: f64,
    pub value: f64,
}

impl RampPoint {
    pub fn new(t_us: f64, value: f64) -> Self {
        Self { t_us, value }
    }
}

/// 生成线性斜坡表
///
/// `end.t_us <= start.t_us` 时返回全零表。
pub fn linear_ramp(
    start: RampPoint,
    end: RampPoint,
    window: &PulseWindow,
    geometry: &TableGeometry,
) -> Vec<f64> {
    let mut table = vec![0.0; geometry.table_len];
    let span = end.t_us - start.t_us;
    if span.is_nan() || span <= 0.0 {
        return table;
    }

    let slope = (end.value - start.value) / span;
    let period = geometry.sample_period_us();
    let active = geometry.active_count(window.duration_us);
    for (i, slot) in table.iter_mut().take(active).enumerate() {
        let t = window.offset_us + i as f64 * period;
        if t >= start.t_us && t <= end.t_us {
            *slot = start.value + slope * (t - start.t_us);
        }
    }
    table
}
