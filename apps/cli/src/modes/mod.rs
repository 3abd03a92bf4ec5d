//! 运行模式
//!
//! 只有 One-shot 模式：每条命令独立连接、执行、断开。

pub mod oneshot;
