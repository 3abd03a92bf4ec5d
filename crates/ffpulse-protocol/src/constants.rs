//! 设备常量
//!
//! 这些值取自当前使用的 Libera LLRF 固件，尚未在其他固件版本上确认。
//! 上层通过 `DeviceProfile` 覆盖它们，这里只提供默认值。

/// 命令前缀（设备端寄存器访问工具）
pub const IREG_TOOL: &str = "libera-ireg";

/// 波形表长度（采样点数），覆盖一个完整的脉冲周期
pub const TABLE_LEN: usize = 4096;

/// 设备支持的最大脉冲长度（微秒）
pub const MAX_PULSE_US: f64 = 34.0;

/// 最小合法偏移（微秒）
///
/// 设备拒绝字面量 0，偏移为 0 时替换为此值。
pub const MIN_OFFSET_US: f64 = 0.03;

/// 相位写入保护带（度）
pub const PHASE_GUARD_DEG: f64 = 400.0;

/// 相位物理范围（度）
pub const PHASE_LIMIT_DEG: f64 = 180.0;

/// 表格序列化的小数位数
pub const TABLE_DECIMALS: usize = 6;

/// 默认板卡名称
pub const DEFAULT_BOARD: &str = "kupvm1";

/// 脉冲形状模式寄存器的 Table 值
pub const PULSE_SHAPE_TABLE_MODE: &str = "Table";
