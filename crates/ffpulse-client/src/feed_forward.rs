//! 前馈状态协调器
//!
//! 设备不会自己维护最大幅度、偏移、持续时间之间的约束，
//! 协调器负责在上传任何波形表之前把这三个寄存器调整一致：
//!
//! 1. 写入脉冲窗口（偏移 0 替换为最小偏移），回读确认
//! 2. 归一化并重采样波形
//! 3. 写入标量寄存器（最大幅度 / 中心相位），必要时向上修正，回读确认
//! 4. 写入波形表
//!
//! 第 3 步必须在第 4 步之前完成：表的峰值超过设备当前的最大幅度时，物理输出会被截断。

use crate::error::Result;
use crate::profile::DeviceProfile;
use crossbeam_channel::Sender;
use ffpulse_driver::{
    Confirmed, Framer, FramerConfig, QuiescenceFramer, RegisterClient, SessionBuilder,
};
use ffpulse_protocol::{ProtocolError, RegisterMap};
use ffpulse_shell::ShellChannel;
#[cfg(feature = "ssh")]
use ffpulse_shell::{ShellConfig, SshShell};
use ffpulse_waveform::{PulseWindow, RampPoint, SignalKind, Waveform, linear_ramp};
use tracing::{debug, info, warn};

/// 波形上传结果
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    /// 回读确认的脉冲窗口
    pub window: Confirmed<PulseWindow>,
    /// 回读确认的标量（最大幅度或中心相位）
    pub scale: Confirmed<f64>,
    /// 输入是否超出范围而被重新缩放
    pub rescaled: bool,
    /// 窗口内的采样点数
    pub active_samples: usize,
}

/// 单段线性斜坡参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampRequest {
    pub t_start_us: f64,
    pub t_end_us: f64,
    pub a_start: f64,
    pub a_end: f64,
    /// 调用方持有的最大幅度
    pub max_amplitude: f64,
    /// 先把 `max_amplitude` 写入设备
    pub set_max: bool,
    /// 把脉冲窗口改为 `[t_start, t_end]`，否则沿用设备当前窗口
    pub change_pulse: bool,
}

impl RampRequest {
    pub fn new(
        t_start_us: f64,
        t_end_us: f64,
        a_start: f64,
        a_end: f64,
        max_amplitude: f64,
    ) -> Self {
        Self {
            t_start_us,
            t_end_us,
            a_start,
            a_end,
            max_amplitude,
            set_max: false,
            change_pulse: false,
        }
    }

    pub fn set_max(mut self) -> Self {
        self.set_max = true;
        self
    }

    pub fn change_pulse(mut self) -> Self {
        self.change_pulse = true;
        self
    }
}

/// 斜坡上传结果
#[derive(Debug, Clone, PartialEq)]
pub struct RampReport {
    /// 斜坡所在的脉冲窗口
    pub window: PulseWindow,
    /// 用作归一化分母的最大幅度（上传前回读）
    pub max_amplitude: f64,
    /// 已上传的幅度表
    pub table: Vec<f64>,
}

/// 前馈状态协调器
///
/// 独占持有一个会话；所有操作同步阻塞，同一时刻只有一条命令在途。
/// 可选的日志通道用于把操作员可读的文本行交给前端显示。
pub struct FeedForward<F: Framer> {
    client: RegisterClient<F>,
    registers: RegisterMap,
    profile: DeviceProfile,
    log: Option<Sender<String>>,
}

#[cfg(feature = "ssh")]
impl FeedForward<QuiescenceFramer<SshShell>> {
    /// 通过 SSH 连接设备并完成 `Table` 模式引导
    pub fn connect(
        shell: &ShellConfig,
        framer: FramerConfig,
        profile: DeviceProfile,
    ) -> Result<Self> {
        let client = SessionBuilder::new()
            .framer_config(framer)
            .registers(profile.registers())
            .connect(shell)?;
        info!("Connected to {}", shell.host);
        Ok(Self::new(client, profile))
    }
}

impl<C: ShellChannel> FeedForward<QuiescenceFramer<C>> {
    /// 在已打开的 shell 上建立会话
    pub fn attach(channel: C, framer: FramerConfig, profile: DeviceProfile) -> Result<Self> {
        let client = SessionBuilder::new()
            .framer_config(framer)
            .registers(profile.registers())
            .attach(channel)?;
        Ok(Self::new(client, profile))
    }
}

impl<F: Framer> FeedForward<F> {
    pub fn new(client: RegisterClient<F>, profile: DeviceProfile) -> Self {
        Self {
            client,
            registers: profile.registers(),
            profile,
            log: None,
        }
    }

    /// 附加日志通道
    pub fn with_log_sink(mut self, sink: Sender<String>) -> Self {
        self.log = Some(sink);
        self
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn registers(&self) -> &RegisterMap {
        &self.registers
    }

    pub fn client(&self) -> &RegisterClient<F> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut RegisterClient<F> {
        &mut self.client
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// 关闭会话，幂等
    pub fn close(&mut self) {
        self.client.close();
    }

    // ==================== 标量寄存器 ====================

    /// 设置最大幅度并回读确认
    pub fn set_max_amplitude(&mut self, value: f64) -> Result<Confirmed<f64>> {
        ProtocolError::check_range("max_amplitude", value, f64::MIN, f64::MAX)?;
        let confirmed = self.client.set_scalar(&self.registers.ff_amplitude, value)?;
        self.note(format!("Max amplitude set to {}", confirmed.confirmed));
        Ok(confirmed)
    }

    /// 读取当前最大幅度
    pub fn max_amplitude(&mut self) -> Result<f64> {
        Ok(self.client.read_scalar(&self.registers.ff_amplitude)?)
    }

    /// 设置脉冲窗口并回读确认
    ///
    /// 先写持续时间再写偏移，两者分别回读。偏移 0 在发送前替换为最小偏移。
    /// 持续时间超过设备上限只记录警告，截断由窗口计算隐式完成。
    ///
    /// # Errors
    /// - `OutOfRange`: 偏移或持续时间为负数（不发送任何命令）
    pub fn set_interval(
        &mut self,
        offset_us: f64,
        duration_us: f64,
    ) -> Result<Confirmed<PulseWindow>> {
        self.check_window(offset_us, duration_us)?;
        let offset_us = self.profile.coerce_offset(offset_us);
        let max_pulse_us = self.profile.max_pulse_us;
        if duration_us > max_pulse_us {
            warn!(
                "Pulse duration {} µs exceeds the {} µs table; the tail will be truncated",
                duration_us, max_pulse_us
            );
            self.note(format!(
                "Duration {} µs exceeds {} µs, only the first {} µs are shaped",
                duration_us, max_pulse_us, max_pulse_us
            ));
        } else if offset_us + duration_us > max_pulse_us {
            warn!(
                "Pulse window ends at {} µs, past the {} µs limit",
                offset_us + duration_us,
                max_pulse_us
            );
            self.note(format!(
                "Window end {} µs exceeds {} µs, the device may cut the pulse short",
                offset_us + duration_us,
                max_pulse_us
            ));
        }

        let duration = self.client.write_intent(&self.registers.ff_duration, duration_us)?;
        let offset = self.client.write_intent(&self.registers.ff_offset, offset_us)?;
        let duration = duration.verify(&mut self.client)?;
        let offset = offset.verify(&mut self.client)?;

        let window = Confirmed {
            requested: PulseWindow::new(offset.requested, duration.requested),
            confirmed: PulseWindow::new(offset.confirmed, duration.confirmed),
        };
        self.note(format!(
            "Interval set: offset {} µs, duration {} µs",
            window.confirmed.offset_us, window.confirmed.duration_us
        ));
        Ok(window)
    }

    /// 读取当前脉冲窗口
    pub fn interval(&mut self) -> Result<PulseWindow> {
        let offset = self.client.read_scalar(&self.registers.ff_offset)?;
        let duration = self.client.read_scalar(&self.registers.ff_duration)?;
        Ok(PulseWindow::new(offset, duration))
    }

    /// 设置中心相位并回读确认
    ///
    /// # Errors
    /// - `OutOfRange`: 超出 ±`phase_guard_deg`（不发送任何命令）
    pub fn set_phase(&mut self, phase_deg: f64) -> Result<Confirmed<f64>> {
        self.check_phase(phase_deg)?;
        let confirmed = self.client.set_scalar(&self.registers.ff_phase, phase_deg)?;
        self.note(format!("Phase set to {}", confirmed.confirmed));
        Ok(confirmed)
    }

    // ==================== 波形上传 ====================

    /// 上传幅度波形
    ///
    /// 1-D 波形填满 `window`；2-D 波形使用自身时间戳的范围 `[t_first, t_last]` 作为窗口。
    /// 输入超出 [0,1] 时整体缩放，最大幅度改为输入的峰值。
    pub fn upload_amplitude(
        &mut self,
        waveform: &Waveform,
        max_amplitude: f64,
        window: PulseWindow,
    ) -> Result<UploadReport> {
        let window = waveform.window().unwrap_or(window);
        self.upload(SignalKind::Amplitude, waveform, max_amplitude, window)
    }

    /// 上传幅度波形到显式窗口 `[t_start, t_end]`
    pub fn upload_amplitude_span(
        &mut self,
        waveform: &Waveform,
        max_amplitude: f64,
        t_start_us: f64,
        t_end_us: f64,
    ) -> Result<UploadReport> {
        let window = PulseWindow::from_span(t_start_us, t_end_us);
        self.upload(SignalKind::Amplitude, waveform, max_amplitude, window)
    }

    /// 上传相位波形
    ///
    /// 窗口规则同 [`upload_amplitude`](Self::upload_amplitude)。
    /// 输入超出 [-180,180] 时整体缩放，中心相位改为隐含值。
    pub fn upload_phase(
        &mut self,
        waveform: &Waveform,
        center_phase_deg: f64,
        window: PulseWindow,
    ) -> Result<UploadReport> {
        let window = waveform.window().unwrap_or(window);
        self.upload(SignalKind::Phase, waveform, center_phase_deg, window)
    }

    /// 上传相位波形到显式窗口 `[t_start, t_end]`
    pub fn upload_phase_span(
        &mut self,
        waveform: &Waveform,
        center_phase_deg: f64,
        t_start_us: f64,
        t_end_us: f64,
    ) -> Result<UploadReport> {
        let window = PulseWindow::from_span(t_start_us, t_end_us);
        self.upload(SignalKind::Phase, waveform, center_phase_deg, window)
    }

    fn upload(
        &mut self,
        kind: SignalKind,
        waveform: &Waveform,
        scale: f64,
        window: PulseWindow,
    ) -> Result<UploadReport> {
        let (normalized, implied) = waveform.normalized(kind);
        let resolved = implied.unwrap_or(scale);

        // 所有检查在第一条命令之前完成
        self.check_window(window.offset_us, window.duration_us)?;
        if kind == SignalKind::Phase {
            self.check_phase(resolved)?;
        }

        let window = self.set_interval(window.offset_us, window.duration_us)?;

        if let Some(implied) = implied {
            warn!(
                "{:?} waveform outside its table range, scale set to {}",
                kind, implied
            );
            self.note(format!("Waveform rescaled, scale changed to {}", implied));
        }
        let scale = match kind {
            SignalKind::Amplitude => self.set_max_amplitude(resolved)?,
            SignalKind::Phase => self.set_phase(resolved)?,
        };

        let geometry = self.profile.geometry();
        let active_samples = geometry.active_count(window.confirmed.duration_us);
        let table = normalized.to_table(&window.confirmed, &geometry);
        let table_path = match kind {
            SignalKind::Amplitude => &self.registers.table_amp,
            SignalKind::Phase => &self.registers.table_phase,
        };
        self.client.write_table(table_path, &table)?;

        self.note(format!(
            "{:?} waveform uploaded ({}-D, {} active samples)",
            kind,
            waveform.rank(),
            active_samples
        ));
        Ok(UploadReport {
            window,
            scale,
            rescaled: implied.is_some(),
            active_samples,
        })
    }

    /// 上传单段线性斜坡
    ///
    /// 斜坡端点按上传前回读的最大幅度归一化；端点超过设备当前的最大幅度时先向上修正。
    ///
    /// # Errors
    /// - `OutOfRange`: `t_end <= t_start`，窗口为负，或设备最大幅度不为正
    pub fn single_ramp(&mut self, request: &RampRequest) -> Result<RampReport> {
        if request.t_end_us.is_nan() || request.t_end_us <= request.t_start_us {
            return Err(ProtocolError::OutOfRange {
                field: "t_end",
                value: request.t_end_us,
                min: request.t_start_us,
                max: f64::INFINITY,
            }
            .into());
        }
        ProtocolError::check_range("a_start", request.a_start, f64::MIN, f64::MAX)?;
        ProtocolError::check_range("a_end", request.a_end, f64::MIN, f64::MAX)?;
        let span = PulseWindow::from_span(request.t_start_us, request.t_end_us);
        if request.change_pulse {
            self.check_window(span.offset_us, span.duration_us)?;
        }

        let window = if request.change_pulse {
            let window = self.set_interval(span.offset_us, span.duration_us)?.confirmed;
            self.note("Offset and duration changed to fit the ramp");
            window
        } else {
            let window = self.interval()?;
            self.note(format!(
                "Offset and duration kept at {} µs, {} µs",
                window.offset_us, window.duration_us
            ));
            window
        };

        if request.set_max {
            self.set_max_amplitude(request.max_amplitude)?;
        }
        // 以设备当前的最大幅度为准，调用方持有的值可能已过期
        let peak = request.a_start.max(request.a_end);
        let mut max_amplitude = self.max_amplitude()?;
        if peak > max_amplitude {
            max_amplitude = self.set_max_amplitude(peak)?.confirmed;
            self.note(format!("Ramp endpoint {} above max amplitude, max raised", peak));
            if max_amplitude < peak {
                warn!("Device clamped max amplitude to {} (ramp peak {})", max_amplitude, peak);
            }
        }
        if max_amplitude.is_nan() || max_amplitude <= 0.0 {
            return Err(ProtocolError::OutOfRange {
                field: "max_amplitude",
                value: max_amplitude,
                min: f64::MIN_POSITIVE,
                max: f64::INFINITY,
            }
            .into());
        }

        let table = linear_ramp(
            RampPoint::new(request.t_start_us, request.a_start / max_amplitude),
            RampPoint::new(request.t_end_us, request.a_end / max_amplitude),
            &window,
            &self.profile.geometry(),
        );
        self.client.write_table(&self.registers.table_amp, &table)?;
        self.note("Ramp uploaded");

        Ok(RampReport {
            window,
            max_amplitude,
            table,
        })
    }

    /// 恢复默认的平坦波形（幅度 1、相位 0），不回读
    pub fn restore_defaults(&mut self) -> Result<()> {
        self.client.write_scalar(&self.registers.table_amp, 1.0)?;
        self.client.write_scalar(&self.registers.table_phase, 0.0)?;
        self.note("Defaults restored");
        Ok(())
    }

    // ==================== 内部辅助 ====================

    fn check_window(&self, offset_us: f64, duration_us: f64) -> Result<()> {
        ProtocolError::check_range("offset", offset_us, 0.0, f64::MAX)?;
        ProtocolError::check_range("duration", duration_us, 0.0, f64::MAX)?;
        Ok(())
    }

    fn check_phase(&self, phase_deg: f64) -> Result<()> {
        let guard = self.profile.phase_guard_deg;
        ProtocolError::check_range("phase", phase_deg, -guard, guard)?;
        Ok(())
    }

    fn note(&self, line: impl Into<String>) {
        let line = line.into();
        debug!("{}", line);
        if let Some(sink) = &self.log {
            // 前端已退出时丢弃
            let _ = sink.send(line);
        }
    }
}
