//! 标量寄存器设置命令
//!
//! 每个设置都会回读确认；设备截断了请求值时给出警告。

use anyhow::Result;
use clap::Args;
use ffpulse_client::Confirmed;

use crate::modes::oneshot::{ConnectArgs, OneShotMode};

/// 设置最大幅度
#[derive(Args, Debug)]
pub struct SetAmpCommand {
    /// 最大幅度
    pub value: f64,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl SetAmpCommand {
    pub async fn execute(self, mode: &OneShotMode) -> Result<()> {
        let value = self.value;
        let confirmed = mode
            .run(&self.connect, move |device| Ok(device.set_max_amplitude(value)?))
            .await?;
        report("最大幅度", &confirmed);
        Ok(())
    }
}

/// 设置脉冲窗口
#[derive(Args, Debug)]
pub struct SetIntervalCommand {
    /// 偏移（微秒，0 会被替换为最小偏移）
    #[arg(long)]
    pub offset: f64,

    /// 持续时间（微秒）
    #[arg(long)]
    pub duration: f64,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl SetIntervalCommand {
    pub async fn execute(self, mode: &OneShotMode) -> Result<()> {
        let (offset, duration) = (self.offset, self.duration);
        let window = mode
            .run(&self.connect, move |device| Ok(device.set_interval(offset, duration)?))
            .await?;

        report(
            "偏移 (µs)",
            &Confirmed {
                requested: window.requested.offset_us,
                confirmed: window.confirmed.offset_us,
            },
        );
        report(
            "持续时间 (µs)",
            &Confirmed {
                requested: window.requested.duration_us,
                confirmed: window.confirmed.duration_us,
            },
        );
        Ok(())
    }
}

/// 设置中心相位
#[derive(Args, Debug)]
pub struct SetPhaseCommand {
    /// 相位（度，±400 以内）
    #[arg(allow_hyphen_values = true)]
    pub degrees: f64,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl SetPhaseCommand {
    pub async fn execute(self, mode: &OneShotMode) -> Result<()> {
        let degrees = self.degrees;
        let confirmed = mode
            .run(&self.connect, move |device| Ok(device.set_phase(degrees)?))
            .await?;
        report("相位 (°)", &confirmed);
        Ok(())
    }
}

/// 打印回读结果
pub fn report(name: &str, confirmed: &Confirmed<f64>) {
    if confirmed.is_exact() {
        println!("✅ {}: {}", name, confirmed.confirmed);
    } else {
        println!(
            "⚠️  {}: 请求 {}，设备回读 {}",
            name, confirmed.requested, confirmed.confirmed
        );
    }
}
