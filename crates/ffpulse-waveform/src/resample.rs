//! # 重采样
//!
//! 输入波形长度任意，设备表长度固定，因此需要线性插值。

/// 均匀时基重采样
///
/// 输入视为均匀分布在 [0,1] 上，映射到 `target_len` 个均匀分布的输出点。
/// 两端点精确保留。
pub fn resample(signal: &[f64], target_len: usize) -> Vec<f64> {
    match (signal.len(), target_len) {
        (_, 0) | (0, _) => vec![0.0; target_len],
        (1, _) => vec![signal[0]; target_len],
        (_, 1) => vec![signal[0]],
        (len, n) => {
            let last = (len - 1) as f64;
            let denom = (n - 1) as f64;
            (0..n)
                .map(|i| {
                    let pos = i as f64 / denom * last;
                    let j = (pos.floor() as usize).min(len - 2);
                    lerp(signal[j], signal[j + 1], pos - j as f64)
                })
                .collect()
        },
    }
}

/// 非均匀时基重采样
///
/// 在 `[times[0], times[last]]` 上均匀取 `target_len` 个点，
/// 按各自的时间戳线性插值。`times` 必须单调非减，且与 `values` 等长。
pub fn resample_timed(values: &[f64], times: &[f64], target_len: usize) -> Vec<f64> {
    debug_assert_eq!(values.len(), times.len());
    let len = values.len().min(times.len());
    if len < 2 || target_len < 2 {
        return resample(&values[..len], target_len);
    }

    let t_start = times[0];
    let t_end = times[len - 1];
    let step = (t_end - t_start) / (target_len - 1) as f64;
    (0..target_len)
        .map(|k| {
            let t = if k == target_len - 1 {
                t_end
            } else {
                t_start + k as f64 * step
            };
            interp_at(&values[..len], &times[..len], t)
        })
        .collect()
}

/// 单点插值，区间外取端点值
fn interp_at(values: &[f64], times: &[f64], t: f64) -> f64 {
    let last = times.len() - 1;
    if t <= times[0] {
        return values[0];
    }
    if t >= times[last] {
        return values[last];
    }
    // 第一个 times[i] > t 的位置，1 <= upper <= last
    let upper = times.partition_point(|&ti| ti <= t);
    let lower = upper - 1;
    let dt = times[upper] - times[lower];
    if dt <= 0.0 {
        return values[upper];
    }
    lerp(values[lower], values[upper], (t - times[lower]) / dt)
}

#[inline]
fn lerp(a: f64, b: f64, frac: f64) -> f64 {
    a * (1.0 - frac) + b * frac
}
