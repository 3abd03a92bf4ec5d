//! # FFPulse Protocol
//!
//! libera-ireg 寄存器协议定义（无 I/O 依赖）
//!
//! ## 模块
//!
//! - `constants`: 设备常量（表长度、脉冲上限、相位保护带）
//! - `registers`: 寄存器路径映射
//! - `command`: `access` / `dump` 命令构建
//! - `reply`: 响应文本解析
//! - `table`: 波形表序列化
//!
//! ## 线格式
//!
//! 所有命令都是发往交互式 shell 的单行文本：
//!
//! ```text
//! libera-ireg access <dotted.path>=<value>
//! libera-ireg dump <dotted.path>
//! ```
//!
//! 设备不提供结构化应答，读取结果需要从回显文本中提取 `<path>=<value>`。

pub mod command;
pub mod constants;
pub mod registers;
pub mod reply;
pub mod table;

// 重新导出常用类型
pub use command::{Command, Value, Verb};
pub use constants::*;
pub use registers::{RegisterMap, RegisterPath};
pub use reply::parse_scalar;
pub use table::serialize_table;

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 回显文本中没有 `key=value`，或值不是数字
    #[error("Malformed response: {raw:?}")]
    MalformedResponse { raw: String },

    /// 超出设备保护带的值（在发送任何命令之前拒绝）
    #[error("Value out of range for {field}: {value} (allowed [{min}, {max}])")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ProtocolError {
    /// 区间检查辅助函数
    ///
    /// 闭区间 `[min, max]`，NaN 一律视为越界。
    pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, Self> {
        if value >= min && value <= max {
            Ok(value)
        } else {
            Err(Self::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }
}
