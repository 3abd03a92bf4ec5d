//! 波形表序列化
//!
//! 设备要求的线格式：逗号连接，每个采样固定 6 位小数，无空格。
//! 下游固件逐字节解析，格式必须完全一致。

use crate::constants::TABLE_DECIMALS;
use std::fmt::Write;

/// 将采样序列序列化为 `v0,v1,...`
pub fn serialize_table(samples: &[f64]) -> String {
    // "-0.000000," 最多 10 字节，多数采样更短
    let mut out = String::with_capacity(samples.len() * 10);
    for (i, sample) in samples.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // 写入 String 不会失败
        let _ = write!(out, "{:.*}", TABLE_DECIMALS, sample);
    }
    out
}
