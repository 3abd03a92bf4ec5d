//! 前馈协调器集成测试
//!
//! 使用假设备（实现 `Framer`，原样保存写入值）检查命令顺序和回读确认。

mod common;

use common::*;
use ffpulse_client::{FeedForwardError, RampRequest};
use ffpulse_waveform::{PulseWindow, Waveform, WaveformError};

fn six_decimals(values: &str) -> bool {
    values
        .split(',')
        .all(|v| v.split_once('.').map(|(_, frac)| frac.len()) == Some(6))
}

// ==================== 标量寄存器 ====================

#[test]
fn test_set_max_amplitude_round_trip() {
    let mut ff = coordinator(FakeDevice::new());

    let confirmed = ff.set_max_amplitude(750.0).unwrap();
    assert_eq!(confirmed.requested, 750.0);
    assert_eq!(confirmed.confirmed, 750.0);
    assert_eq!(
        journal(&ff),
        &[
            format!("libera-ireg access {}=750", AMP),
            format!("libera-ireg dump {}", AMP),
        ]
    );
}

#[test]
fn test_set_max_amplitude_reports_device_clamp() {
    let mut ff = coordinator(FakeDevice::new().with_clamp(AMP, 1000.0));

    let confirmed = ff.set_max_amplitude(2000.0).unwrap();
    assert!(!confirmed.is_exact());
    assert_eq!(confirmed.confirmed, 1000.0);
}

#[test]
fn test_read_only_queries() {
    let mut ff = coordinator(
        FakeDevice::new()
            .with_register(AMP, "640.5")
            .with_register(OFFSET, "1.5")
            .with_register(DURATION, "20"),
    );

    assert_eq!(ff.max_amplitude().unwrap(), 640.5);
    assert_eq!(ff.interval().unwrap(), PulseWindow::new(1.5, 20.0));
    // 只读不写
    assert!(journal(&ff).iter().all(|line| line.starts_with("libera-ireg dump ")));
}

#[test]
fn test_zero_offset_is_coerced() {
    let mut ff = coordinator(FakeDevice::new());

    let window = ff.set_interval(0.0, 10.0).unwrap();
    assert_eq!(window.requested.offset_us, 0.03);
    assert_eq!(window.confirmed.offset_us, 0.03);
    assert_eq!(window.confirmed.duration_us, 10.0);
    assert_eq!(device(&ff).last_written(OFFSET), Some("0.03"));
    assert!(journal(&ff).iter().all(|line| !line.ends_with("offset=0")));
}

#[test]
fn test_interval_writes_duration_then_offset() {
    let mut ff = coordinator(FakeDevice::new());

    ff.set_interval(2.0, 12.0).unwrap();
    assert_eq!(
        journal(&ff),
        &[
            format!("libera-ireg access {}=12", DURATION),
            format!("libera-ireg access {}=2", OFFSET),
            format!("libera-ireg dump {}", DURATION),
            format!("libera-ireg dump {}", OFFSET),
        ]
    );
}

#[test]
fn test_long_duration_is_accepted() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut ff = coordinator(FakeDevice::new()).with_log_sink(tx);

    let window = ff.set_interval(1.0, 50.0).unwrap();
    assert_eq!(window.confirmed.duration_us, 50.0);
    let lines: Vec<String> = rx.try_iter().collect();
    assert!(lines.iter().any(|l| l.contains("Duration 50 µs exceeds 34 µs")));
}

#[test]
fn test_window_end_past_limit_is_noted() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut ff = coordinator(FakeDevice::new()).with_log_sink(tx);

    let window = ff.set_interval(10.0, 30.0).unwrap();
    assert_eq!(window.confirmed, PulseWindow::new(10.0, 30.0));
    let lines: Vec<String> = rx.try_iter().collect();
    assert!(lines.iter().any(|l| l.contains("Window end 40 µs exceeds 34 µs")));

    // 窗口在上限之内时没有警告
    ff.set_interval(4.0, 30.0).unwrap();
    assert!(rx.try_iter().all(|l| !l.contains("exceeds")));
}

#[test]
fn test_negative_interval_rejected_before_sending() {
    let mut ff = coordinator(FakeDevice::new());

    assert!(ff.set_interval(-1.0, 5.0).unwrap_err().is_out_of_range());
    assert!(ff.set_interval(1.0, -5.0).unwrap_err().is_out_of_range());
    assert!(ff.set_interval(f64::NAN, 5.0).unwrap_err().is_out_of_range());
    assert!(journal(&ff).is_empty());
}

#[test]
fn test_phase_guard_sends_nothing() {
    let mut ff = coordinator(FakeDevice::new());

    assert!(ff.set_phase(401.0).unwrap_err().is_out_of_range());
    assert!(ff.set_phase(-401.0).unwrap_err().is_out_of_range());
    assert!(journal(&ff).is_empty());

    // 保护带边界可以写入
    let confirmed = ff.set_phase(-400.0).unwrap();
    assert_eq!(confirmed.confirmed, -400.0);
    assert_eq!(device(&ff).last_written(PHASE), Some("-400"));
}

#[test]
fn test_malformed_reply_carries_raw_text() {
    let mut ff = coordinator(FakeDevice::new().with_broken(AMP));

    let err = ff.max_amplitude().unwrap_err();
    assert!(err.is_malformed_response());
    assert_eq!(err.raw_response(), Some("ERROR: bad path"));

    // 写入已发出，回读失败原样上抛
    let err = ff.set_max_amplitude(750.0).unwrap_err();
    assert!(err.is_malformed_response());
    assert_eq!(device(&ff).last_written(AMP), Some("750"));
}

#[test]
fn test_closed_session_fails_fast() {
    let mut ff = coordinator(FakeDevice::new());
    ff.close();
    ff.close();

    assert!(!ff.is_connected());
    assert!(ff.set_max_amplitude(750.0).unwrap_err().is_not_connected());
    assert!(journal(&ff).is_empty());
}

// ==================== 波形上传 ====================

#[test]
fn test_upload_amplitude_1d_scenario() {
    let mut ff = coordinator(FakeDevice::new());
    let wave = Waveform::uniform(vec![0.2, 0.5, 1.0, 0.5, 0.2]).unwrap();

    let report = ff
        .upload_amplitude(&wave, 750.0, PulseWindow::new(1.0, 10.0))
        .unwrap();
    assert_eq!(report.active_samples, 1205);
    assert!(!report.rescaled);
    assert_eq!(report.scale.confirmed, 750.0);
    assert_eq!(report.window.confirmed, PulseWindow::new(1.0, 10.0));

    let dev = device(&ff);
    let text = dev.last_written(TABLE_AMP).unwrap();
    assert!(six_decimals(text));
    let table = parse_table(text);
    assert_eq!(table.len(), 4096);
    assert_eq!(table[0], 0.2);
    assert_eq!(table[1204], 0.2);
    assert!(table[..1205].iter().all(|&v| v >= 0.2));
    assert_eq!(table[1205..].len(), 2891);
    assert!(table[1205..].iter().all(|&v| v == 0.0));

    // 窗口 → 最大幅度 → 表
    let interval = dev.position_of(&format!("libera-ireg access {}=", DURATION)).unwrap();
    let scale = dev.position_of(&format!("libera-ireg access {}=", AMP)).unwrap();
    let upload = dev.position_of(&format!("libera-ireg access {}=", TABLE_AMP)).unwrap();
    assert!(interval < scale && scale < upload);
}

#[test]
fn test_upload_amplitude_escalates_before_table() {
    let mut ff = coordinator(FakeDevice::new().with_register(AMP, "1"));
    let wave = Waveform::uniform(vec![100.0, 300.0, 500.0]).unwrap();

    let report = ff
        .upload_amplitude(&wave, 1.0, PulseWindow::new(1.0, 34.0))
        .unwrap();
    assert!(report.rescaled);
    assert!(report.scale.confirmed >= 500.0);

    let dev = device(&ff);
    let scale = dev.position_of(&format!("libera-ireg access {}=500", AMP)).unwrap();
    let upload = dev.position_of(&format!("libera-ireg access {}=", TABLE_AMP)).unwrap();
    assert!(scale < upload);

    let table = parse_table(dev.last_written(TABLE_AMP).unwrap());
    assert_eq!(table.len(), 4096);
    assert_eq!(table[0], 0.0);
    assert_eq!(table[4095], 1.0);
    assert!(table.iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn test_upload_amplitude_2d_uses_timestamps() {
    let mut ff = coordinator(FakeDevice::new());
    let wave = Waveform::timed(&[(0.2, 2.0), (1.0, 7.0), (0.2, 12.0)]).unwrap();

    // 2-D 波形忽略调用方窗口
    let report = ff
        .upload_amplitude(&wave, 750.0, PulseWindow::new(5.0, 30.0))
        .unwrap();
    assert_eq!(report.window.confirmed, PulseWindow::new(2.0, 10.0));
    assert_eq!(report.active_samples, 1205);

    let dev = device(&ff);
    assert_eq!(dev.last_written(OFFSET), Some("2"));
    assert_eq!(dev.last_written(DURATION), Some("10"));
    let table = parse_table(dev.last_written(TABLE_AMP).unwrap());
    assert_eq!(table[0], 0.2);
    let peak = table.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!((peak - 1.0).abs() < 1e-3);
    assert!(table[1205..].iter().all(|&v| v == 0.0));
}

#[test]
fn test_upload_amplitude_span_zero_start() {
    let mut ff = coordinator(FakeDevice::new());
    let wave = Waveform::uniform(vec![0.5, 0.5]).unwrap();

    let report = ff.upload_amplitude_span(&wave, 10.0, 0.0, 17.0).unwrap();
    assert_eq!(report.window.confirmed.offset_us, 0.03);
    assert_eq!(report.active_samples, 2048);
}

#[test]
fn test_upload_phase_rescales_and_sets_center() {
    let mut ff = coordinator(FakeDevice::new());
    let wave = Waveform::uniform(vec![0.0, 180.0, 360.0]).unwrap();

    let report = ff
        .upload_phase(&wave, 0.0, PulseWindow::new(0.5, 34.0))
        .unwrap();
    assert!(report.rescaled);
    assert_eq!(report.scale.confirmed, 180.0);

    let dev = device(&ff);
    let center = dev.position_of(&format!("libera-ireg access {}=180", PHASE)).unwrap();
    let upload = dev.position_of(&format!("libera-ireg access {}=", TABLE_PHASE)).unwrap();
    assert!(center < upload);

    let table = parse_table(dev.last_written(TABLE_PHASE).unwrap());
    assert_eq!(table.len(), 4096);
    assert_eq!(table[0], -180.0);
    assert_eq!(table[4095], 180.0);
}

#[test]
fn test_upload_phase_guard_sends_nothing() {
    let mut ff = coordinator(FakeDevice::new());
    let in_range = Waveform::uniform(vec![-10.0, 10.0]).unwrap();
    assert!(
        ff.upload_phase(&in_range, 401.0, PulseWindow::new(1.0, 10.0))
            .unwrap_err()
            .is_out_of_range()
    );

    // 隐含中心相位 (1000 - 0) / 2 = 500 超出保护带
    let wide = Waveform::uniform(vec![0.0, 1000.0]).unwrap();
    assert!(
        ff.upload_phase(&wide, 0.0, PulseWindow::new(1.0, 10.0))
            .unwrap_err()
            .is_out_of_range()
    );
    assert!(journal(&ff).is_empty());
}

#[test]
fn test_unsupported_shape() {
    let err: FeedForwardError = Waveform::from_shape(&[2, 2, 2], &[0.0; 8])
        .map_err(FeedForwardError::from)
        .unwrap_err();
    assert!(err.is_unsupported_shape());
    assert!(matches!(
        err,
        FeedForwardError::Waveform(WaveformError::UnsupportedShape { .. })
    ));
}

// ==================== 斜坡与默认值 ====================

#[test]
fn test_single_ramp_keeps_current_interval() {
    let mut ff = coordinator(
        FakeDevice::new()
            .with_register(OFFSET, "0")
            .with_register(DURATION, "34")
            .with_register(AMP, "1000"),
    );

    let report = ff
        .single_ramp(&RampRequest::new(0.0, 34.0, 0.0, 500.0, 1000.0))
        .unwrap();
    assert_eq!(report.window, PulseWindow::new(0.0, 34.0));
    assert_eq!(report.max_amplitude, 1000.0);
    // 17 µs 处为 250 / 1000
    assert!((report.table[2048] - 0.25).abs() < 1e-12);

    let dev = device(&ff);
    assert!(dev.last_written(AMP).is_none());
    assert!(dev.last_written(OFFSET).is_none());
    let table = parse_table(dev.last_written(TABLE_AMP).unwrap());
    assert_eq!(table[2048], 0.25);
}

#[test]
fn test_single_ramp_escalates_max_amplitude() {
    let mut ff = coordinator(
        FakeDevice::new()
            .with_register(OFFSET, "0")
            .with_register(DURATION, "34")
            .with_register(AMP, "100"),
    );

    let report = ff
        .single_ramp(&RampRequest::new(0.0, 34.0, 600.0, 500.0, 100.0))
        .unwrap();
    assert_eq!(report.max_amplitude, 600.0);
    assert_eq!(report.table[0], 1.0);

    let dev = device(&ff);
    let scale = dev.position_of(&format!("libera-ireg access {}=600", AMP)).unwrap();
    let upload = dev.position_of(&format!("libera-ireg access {}=", TABLE_AMP)).unwrap();
    assert!(scale < upload);
}

#[test]
fn test_single_ramp_escalates_against_device_max() {
    // 调用方持有的 1000 已过期，设备实际为 100
    let mut ff = coordinator(
        FakeDevice::new()
            .with_register(OFFSET, "0")
            .with_register(DURATION, "34")
            .with_register(AMP, "100"),
    );

    let report = ff
        .single_ramp(&RampRequest::new(0.0, 34.0, 0.0, 500.0, 1000.0))
        .unwrap();
    assert_eq!(report.max_amplitude, 500.0);
    assert!(report.table.iter().all(|&v| v <= 1.0));

    let dev = device(&ff);
    assert_eq!(dev.last_written(AMP), Some("500"));
    let scale = dev.position_of(&format!("libera-ireg access {}=500", AMP)).unwrap();
    let upload = dev.position_of(&format!("libera-ireg access {}=", TABLE_AMP)).unwrap();
    assert!(scale < upload);
    let table = parse_table(dev.last_written(TABLE_AMP).unwrap());
    assert!(table.iter().all(|&v| v <= 1.0));
}

#[test]
fn test_single_ramp_change_pulse() {
    let mut ff = coordinator(FakeDevice::new().with_register(AMP, "1"));

    let report = ff
        .single_ramp(&RampRequest::new(5.0, 15.0, 0.1, 0.1, 1.0).change_pulse().set_max())
        .unwrap();
    assert_eq!(report.window, PulseWindow::new(5.0, 10.0));

    let dev = device(&ff);
    assert_eq!(dev.last_written(OFFSET), Some("5"));
    assert_eq!(dev.last_written(DURATION), Some("10"));
    assert_eq!(dev.last_written(AMP), Some("1"));
    assert!(report.table[..1205].iter().all(|&v| (v - 0.1).abs() < 1e-12));
    assert!(report.table[1205..].iter().all(|&v| v == 0.0));
}

#[test]
fn test_single_ramp_rejects_bad_requests() {
    let mut ff = coordinator(FakeDevice::new());
    assert!(
        ff.single_ramp(&RampRequest::new(10.0, 10.0, 0.0, 1.0, 1.0))
            .unwrap_err()
            .is_out_of_range()
    );
    assert!(journal(&ff).is_empty());

    // 设备最大幅度为 0，无法归一化
    let mut ff = coordinator(
        FakeDevice::new()
            .with_register(OFFSET, "1")
            .with_register(DURATION, "10")
            .with_register(AMP, "0"),
    );
    assert!(
        ff.single_ramp(&RampRequest::new(1.0, 11.0, 0.0, 0.0, 0.0))
            .unwrap_err()
            .is_out_of_range()
    );
    assert!(device(&ff).last_written(TABLE_AMP).is_none());
}

#[test]
fn test_restore_defaults() {
    let mut ff = coordinator(FakeDevice::new());

    ff.restore_defaults().unwrap();
    assert_eq!(
        journal(&ff),
        &[
            format!("libera-ireg access {}=1", TABLE_AMP),
            format!("libera-ireg access {}=0", TABLE_PHASE),
        ]
    );
}

// ==================== 日志通道 ====================

#[test]
fn test_log_sink_receives_lines() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut ff = coordinator(FakeDevice::new()).with_log_sink(tx);

    ff.set_max_amplitude(750.0).unwrap();
    ff.set_interval(0.0, 10.0).unwrap();
    let lines: Vec<String> = rx.try_iter().collect();
    assert!(lines.iter().any(|l| l.contains("750")));
    assert!(lines.iter().any(|l| l.contains("0.03")));

    // 前端退出后操作照常进行
    drop(rx);
    ff.restore_defaults().unwrap();
}
