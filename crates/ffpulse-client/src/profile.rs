//! 设备参数
//!
//! 脉冲上限 34 µs、最小偏移 0.03 µs 等值来自当前固件版本，
//! 集中在这里作为可配置项，更换固件时需要重新确认。

use ffpulse_protocol::{
    DEFAULT_BOARD, MAX_PULSE_US, MIN_OFFSET_US, PHASE_GUARD_DEG, RegisterMap, TABLE_LEN,
};
use ffpulse_waveform::TableGeometry;

/// 设备参数
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceProfile {
    /// 板卡名（寄存器路径 `boards.<board>.` 前缀）
    pub board: String,
    /// 波形表覆盖的最大脉冲长度（微秒）
    pub max_pulse_us: f64,
    /// 设备接受的最小偏移（微秒），偏移 0 被替换为该值
    pub min_offset_us: f64,
    /// 波形表长度
    pub table_len: usize,
    /// 相位写入保护带（度）
    pub phase_guard_deg: f64,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            board: DEFAULT_BOARD.to_string(),
            max_pulse_us: MAX_PULSE_US,
            min_offset_us: MIN_OFFSET_US,
            table_len: TABLE_LEN,
            phase_guard_deg: PHASE_GUARD_DEG,
        }
    }
}

impl DeviceProfile {
    /// 指定板卡，其余使用默认值
    pub fn for_board(board: impl Into<String>) -> Self {
        Self {
            board: board.into(),
            ..Self::default()
        }
    }

    pub fn registers(&self) -> RegisterMap {
        RegisterMap::for_board(&self.board)
    }

    pub fn geometry(&self) -> TableGeometry {
        TableGeometry {
            table_len: self.table_len,
            max_pulse_us: self.max_pulse_us,
        }
    }

    /// 偏移 0 替换为最小偏移
    pub fn coerce_offset(&self, offset_us: f64) -> f64 {
        if offset_us == 0.0 {
            self.min_offset_us
        } else {
            offset_us
        }
    }
}
