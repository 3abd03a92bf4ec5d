//! 寄存器路径
//!
//! 路径是不透明的点分字符串，客户端从不把它解析成树。

use crate::constants::DEFAULT_BOARD;
use std::fmt;

/// 单个设备参数的点分路径（例如 `boards.kupvm1.dsp.ff_amp.amplitude`）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterPath(String);

impl RegisterPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegisterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegisterPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// 前馈相关的寄存器映射
///
/// 所有路径都挂在同一块板卡下，通过 [`RegisterMap::for_board`] 生成。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMap {
    /// 脉冲形状模式（`Table` 模式是上传波形表的前提）
    pub pulse_shape_mode: RegisterPath,
    /// 幅度表
    pub table_amp: RegisterPath,
    /// 相位表
    pub table_phase: RegisterPath,
    /// 前馈最大幅度（幅度表的缩放系数）
    pub ff_amplitude: RegisterPath,
    /// 前馈中心相位（相位表的缩放基准）
    pub ff_phase: RegisterPath,
    /// 脉冲偏移（微秒）
    pub ff_offset: RegisterPath,
    /// 脉冲持续时间（微秒）
    pub ff_duration: RegisterPath,
}

impl RegisterMap {
    /// 为指定板卡生成寄存器映射
    pub fn for_board(board: &str) -> Self {
        let dsp = format!("boards.{board}.dsp");
        let ff = format!("boards.{board}.feed_forward");
        Self {
            pulse_shape_mode: RegisterPath::new(format!("{dsp}.ff_pulse_shape.mode")),
            table_amp: RegisterPath::new(format!("{dsp}.ff_pulse_shape.table_amp")),
            table_phase: RegisterPath::new(format!("{dsp}.ff_pulse_shape.table_phase")),
            ff_amplitude: RegisterPath::new(format!("{dsp}.ff_amp.amplitude")),
            ff_phase: RegisterPath::new(format!("{dsp}.ff_phase.phase")),
            ff_offset: RegisterPath::new(format!("{ff}.offset")),
            ff_duration: RegisterPath::new(format!("{ff}.duration")),
        }
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::for_board(DEFAULT_BOARD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_paths() {
        let map = RegisterMap::default();
        assert_eq!(map.ff_amplitude.as_str(), "boards.kupvm1.dsp.ff_amp.amplitude");
        assert_eq!(map.ff_phase.as_str(), "boards.kupvm1.dsp.ff_phase.phase");
        assert_eq!(
            map.pulse_shape_mode.as_str(),
            "boards.kupvm1.dsp.ff_pulse_shape.mode"
        );
        assert_eq!(
            map.table_amp.as_str(),
            "boards.kupvm1.dsp.ff_pulse_shape.table_amp"
        );
        assert_eq!(
            map.table_phase.as_str(),
            "boards.kupvm1.dsp.ff_pulse_shape.table_phase"
        );
        assert_eq!(map.ff_offset.as_str(), "boards.kupvm1.feed_forward.offset");
        assert_eq!(map.ff_duration.as_str(), "boards.kupvm1.feed_forward.duration");
    }

    #[test]
    fn test_other_board() {
        let map = RegisterMap::for_board("kupvm2");
        assert_eq!(map.ff_offset.to_string(), "boards.kupvm2.feed_forward.offset");
    }
}
