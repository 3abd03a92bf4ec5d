//! 单段线性斜坡命令

use anyhow::Result;
use clap::Args;
use ffpulse_client::RampRequest;

use crate::modes::oneshot::{ConnectArgs, OneShotMode};

/// 斜坡命令参数
#[derive(Args, Debug)]
pub struct RampCommand {
    /// 起始时间（微秒）
    #[arg(long)]
    pub t_start: f64,

    /// 结束时间（微秒）
    #[arg(long)]
    pub t_end: f64,

    /// 起始幅度
    #[arg(long)]
    pub a_start: f64,

    /// 结束幅度
    #[arg(long)]
    pub a_end: f64,

    /// 当前最大幅度
    #[arg(long)]
    pub max: f64,

    /// 先写入 `--max`
    #[arg(long)]
    pub set_max: bool,

    /// 把脉冲窗口改为 `[t_start, t_end]`
    #[arg(long)]
    pub change_pulse: bool,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl RampCommand {
    pub fn request(&self) -> RampRequest {
        let mut request =
            RampRequest::new(self.t_start, self.t_end, self.a_start, self.a_end, self.max);
        if self.set_max {
            request = request.set_max();
        }
        if self.change_pulse {
            request = request.change_pulse();
        }
        request
    }

    pub async fn execute(self, mode: &OneShotMode) -> Result<()> {
        let request = self.request();
        let result = mode
            .run(&self.connect, move |device| Ok(device.single_ramp(&request)?))
            .await?;

        println!(
            "✅ 斜坡已上传: 窗口 {} µs + {} µs，最大幅度 {}",
            result.window.offset_us, result.window.duration_us, result.max_amplitude
        );
        Ok(())
    }
}
