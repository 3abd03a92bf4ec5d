//! 驱动层模块
//!
//! 本模块在交互式 shell 之上提供寄存器访问能力，包括：
//! - 响应分帧（基于静默的启发式，可替换的 `Framer` trait）
//! - 寄存器协议客户端（`access` / `dump`，两阶段写入确认）
//! - 会话建立与引导（`Table` 模式）
//!
//! # 并发模型
//!
//! 全部同步阻塞。shell 没有多路复用也没有请求 ID，同一会话上同一时刻只能有一条命令在途，
//! 由 `&mut self` 独占访问保证。需要保持界面响应的前端应自行把调用派发到工作线程。

mod builder;
pub mod client;
mod error;
pub mod framer;

#[cfg(feature = "ssh")]
pub use builder::Session;
pub use builder::SessionBuilder;
pub use client::{Confirmed, PendingWrite, RegisterClient};
pub use error::DriverError;
pub use framer::{Framer, FramerConfig, QuiescenceFramer};
