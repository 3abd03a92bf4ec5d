//! 命令构建
//!
//! 每次调用都新建一个 [`Command`]，它本身无状态，只负责生成一行命令文本。

use crate::constants::IREG_TOOL;
use crate::registers::RegisterPath;
use crate::table::serialize_table;
use std::fmt;

/// 命令动词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// 写寄存器
    Access,
    /// 读寄存器
    Dump,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Access => "access",
            Verb::Dump => "dump",
        }
    }
}

/// 写入值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 十进制标量
    Scalar(f64),
    /// 枚举型寄存器的字面值（例如 `Table`）
    Literal(String),
    /// 逗号分隔的波形表
    Table(Vec<f64>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(v) => write!(f, "{}", v),
            Value::Literal(s) => f.write_str(s),
            Value::Table(samples) => f.write_str(&serialize_table(samples)),
        }
    }
}

/// 单条寄存器命令
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub verb: Verb,
    pub path: RegisterPath,
    pub value: Option<Value>,
}

impl Command {
    /// `access <path>=<scalar>`
    pub fn write_scalar(path: &RegisterPath, value: f64) -> Self {
        Self {
            verb: Verb::Access,
            path: path.clone(),
            value: Some(Value::Scalar(value)),
        }
    }

    /// `access <path>=<literal>`
    pub fn write_literal(path: &RegisterPath, literal: impl Into<String>) -> Self {
        Self {
            verb: Verb::Access,
            path: path.clone(),
            value: Some(Value::Literal(literal.into())),
        }
    }

    /// `access <path>=<v0>,<v1>,...`
    ///
    /// 客户端不限制表格长度，整张表作为一行发送。
    pub fn write_table(path: &RegisterPath, samples: &[f64]) -> Self {
        Self {
            verb: Verb::Access,
            path: path.clone(),
            value: Some(Value::Table(samples.to_vec())),
        }
    }

    /// `dump <path>`
    pub fn read(path: &RegisterPath) -> Self {
        Self {
            verb: Verb::Dump,
            path: path.clone(),
            value: None,
        }
    }

    /// 生成发往 shell 的命令行（不含换行符）
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", IREG_TOOL, self.verb.as_str(), self.path)?;
        if let Some(value) = &self.value {
            write!(f, "={}", value)?;
        }
        Ok(())
    }
}
