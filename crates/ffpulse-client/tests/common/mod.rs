//! 测试用的假设备
//!
//! 实现 `Framer`：`access` 写入寄存器表并回显命令，`dump` 返回 `<path>=<value>`。

#![allow(dead_code)]

use ffpulse_client::{DeviceProfile, FeedForward};
use ffpulse_driver::{DriverError, Framer, RegisterClient};
use std::collections::HashMap;

#[derive(Default)]
pub struct FakeDevice {
    /// 寄存器当前值（原始文本）
    pub registers: HashMap<String, String>,
    /// 收到的每一行命令
    pub journal: Vec<String>,
    /// 写入时的上限（模拟设备端截断）
    pub clamps: HashMap<String, f64>,
    /// 对这些路径的 `dump` 返回错误文本
    pub broken: Vec<String>,
    pub closed: bool,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_register(mut self, path: &str, value: &str) -> Self {
        self.registers.insert(path.to_string(), value.to_string());
        self
    }

    pub fn with_clamp(mut self, path: &str, max: f64) -> Self {
        self.clamps.insert(path.to_string(), max);
        self
    }

    pub fn with_broken(mut self, path: &str) -> Self {
        self.broken.push(path.to_string());
        self
    }

    /// 写命令在日志中的位置
    pub fn position_of(&self, prefix: &str) -> Option<usize> {
        self.journal.iter().position(|line| line.starts_with(prefix))
    }

    /// 最后一次写入某个路径的值
    pub fn last_written(&self, path: &str) -> Option<&str> {
        let prefix = format!("libera-ireg access {}=", path);
        self.journal
            .iter()
            .rev()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
    }
}

impl Framer for FakeDevice {
    fn exchange(&mut self, line: &str) -> Result<String, DriverError> {
        if self.closed {
            return Err(DriverError::NotConnected);
        }
        self.journal.push(line.to_string());

        if let Some(assignment) = line.strip_prefix("libera-ireg access ") {
            if let Some((path, value)) = assignment.split_once('=') {
                let stored = match (self.clamps.get(path), value.parse::<f64>()) {
                    (Some(&max), Ok(v)) if v > max => max.to_string(),
                    _ => value.to_string(),
                };
                self.registers.insert(path.to_string(), stored);
            }
            return Ok(line.to_string());
        }

        if let Some(path) = line.strip_prefix("libera-ireg dump ") {
            if self.broken.iter().any(|p| p == path) {
                return Ok("ERROR: bad path".to_string());
            }
            let value = self.registers.get(path).cloned().unwrap_or_else(|| "0".to_string());
            return Ok(format!("{}\n{}={}", line, path, value));
        }

        Ok(String::new())
    }

    fn is_connected(&self) -> bool {
        !self.closed
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

pub const AMP: &str = "boards.kupvm1.dsp.ff_amp.amplitude";
pub const PHASE: &str = "boards.kupvm1.dsp.ff_phase.phase";
pub const OFFSET: &str = "boards.kupvm1.feed_forward.offset";
pub const DURATION: &str = "boards.kupvm1.feed_forward.duration";
pub const TABLE_AMP: &str = "boards.kupvm1.dsp.ff_pulse_shape.table_amp";
pub const TABLE_PHASE: &str = "boards.kupvm1.dsp.ff_pulse_shape.table_phase";

pub fn coordinator(device: FakeDevice) -> FeedForward<FakeDevice> {
    FeedForward::new(RegisterClient::new(device), DeviceProfile::default())
}

pub fn journal(ff: &FeedForward<FakeDevice>) -> &[String] {
    &ff.client().framer().journal
}

pub fn device(ff: &FeedForward<FakeDevice>) -> &FakeDevice {
    ff.client().framer()
}

/// 解析表写入命令中的采样值
pub fn parse_table(values: &str) -> Vec<f64> {
    values.split(',').map(|v| v.parse().unwrap()).collect()
}
