//! 响应解析
//!
//! `dump` 的回显里包含命令本身、提示符以及 `<path>=<value>`。
//! 优先定位 `<path>=`，找不到时退回到第一个 `=`；
//! 值是 `=` 之后（去掉前导空白）的第一个 token，遇到空白或下一个 `=` 截止。

use crate::ProtocolError;
use crate::registers::RegisterPath;

/// 从回显文本中解析标量值
///
/// # Errors
/// - `ProtocolError::MalformedResponse`: 没有 `=`，或 token 不是数字（携带原始文本）
pub fn parse_scalar(raw: &str, path: &RegisterPath) -> Result<f64, ProtocolError> {
    let malformed = || ProtocolError::MalformedResponse {
        raw: raw.to_string(),
    };

    let key = format!("{}=", path.as_str());
    let rest = match raw.find(&key) {
        Some(pos) => &raw[pos + key.len()..],
        None => {
            let pos = raw.find('=').ok_or_else(malformed)?;
            &raw[pos + 1..]
        },
    };

    let token = rest
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '=')
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(malformed)?;

    token.parse::<f64>().map_err(|_| malformed())
}
