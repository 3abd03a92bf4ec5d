//! 状态查询命令

use anyhow::Result;
use clap::Args;

use crate::modes::oneshot::{ConnectArgs, OneShotMode};

/// 查询命令参数
#[derive(Args, Debug)]
pub struct GetCommand {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl GetCommand {
    /// 读取最大幅度和脉冲窗口
    pub async fn execute(self, mode: &OneShotMode) -> Result<()> {
        let (max_amplitude, window) = mode
            .run(&self.connect, |device| {
                let max_amplitude = device.max_amplitude()?;
                let window = device.interval()?;
                Ok((max_amplitude, window))
            })
            .await?;

        println!("📊 前馈状态:");
        println!("  最大幅度: {}", max_amplitude);
        println!("  偏移: {} µs", window.offset_us);
        println!("  持续时间: {} µs", window.duration_us);
        Ok(())
    }
}
