//! Mock shell（脚本化回显）
//!
//! 用于在没有设备的情况下测试分帧和寄存器协议：
//! - 每次 `send` 消费一条预设的 [`MockReply`]，其分块按各自的延迟变为可读
//! - `with_stale` 预置"上一次交互遗留"的字节
//! - 所有发出的内容记录在共享的 [`SentLog`] 中，测试可在 shell 被移走后检查

use crate::{ShellChannel, ShellError};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 一次命令的预设回复
#[derive(Debug, Clone, Default)]
pub struct MockReply {
    chunks: Vec<(Duration, Bytes)>,
}

impl MockReply {
    /// 立即可读的单块回复
    pub fn text(text: impl Into<String>) -> Self {
        Self::default().chunk_after(Duration::ZERO, text)
    }

    /// 不回复任何内容
    pub fn silent() -> Self {
        Self::default()
    }

    /// 追加一个在 `send` 之后 `delay` 才可读的分块
    pub fn chunk_after(mut self, delay: Duration, text: impl Into<String>) -> Self {
        self.chunks.push((delay, Bytes::from(text.into())));
        self
    }
}

/// 已发送内容的共享记录
#[derive(Debug, Clone, Default)]
pub struct SentLog(Arc<Mutex<Vec<String>>>);

impl SentLog {
    /// 已发送的全部内容（按发送顺序）
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    fn push(&self, line: String) {
        self.0.lock().push(line);
    }
}

/// 脚本化 shell
#[derive(Debug, Default)]
pub struct MockShell {
    script: VecDeque<MockReply>,
    pending: VecDeque<(Instant, Bytes)>,
    sent: SentLog,
    closed: bool,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一段尚未消费的旧输出
    pub fn with_stale(mut self, text: impl Into<String>) -> Self {
        self.pending.push_back((Instant::now(), Bytes::from(text.into())));
        self
    }

    /// 追加下一次 `send` 的回复
    pub fn reply(mut self, reply: MockReply) -> Self {
        self.script.push_back(reply);
        self
    }

    /// 共享的发送记录
    pub fn sent_log(&self) -> SentLog {
        self.sent.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ShellChannel for MockShell {
    fn send(&mut self, bytes: &[u8]) -> Result<(), ShellError> {
        if self.closed {
            return Err(ShellError::Closed);
        }
        self.sent.push(String::from_utf8_lossy(bytes).into_owned());

        let now = Instant::now();
        if let Some(reply) = self.script.pop_front() {
            for (delay, chunk) in reply.chunks {
                self.pending.push_back((now + delay, chunk));
            }
        }
        Ok(())
    }

    fn try_receive(&mut self) -> Result<Option<Bytes>, ShellError> {
        if self.closed {
            return Err(ShellError::Closed);
        }
        match self.pending.front() {
            Some((ready_at, _)) if *ready_at <= Instant::now() => {
                Ok(self.pending.pop_front().map(|(_, chunk)| chunk))
            },
            _ => Ok(None),
        }
    }

    fn close(&mut self) -> Result<(), ShellError> {
        self.closed = true;
        self.pending.clear();
        Ok(())
    }
}
