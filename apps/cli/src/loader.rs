//! 波形文本文件加载
//!
//! 每行一个采样，列之间用空白或逗号分隔，`#` 之后为注释：
//! - 一列：1-D 波形（均匀时基）
//! - 两列：`value time_us`（2-D 波形）
//!
//! 所有数据行的列数必须一致。

use anyhow::{Context, Result};
use ffpulse_waveform::Waveform;
use std::fs;
use std::path::Path;

/// 从文件加载波形
pub fn load_waveform(path: &Path) -> Result<Waveform> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("读取波形文件失败: {}", path.display()))?;
    parse_waveform(&text).with_context(|| format!("解析波形文件失败: {}", path.display()))
}

/// 解析波形文本
pub fn parse_waveform(text: &str) -> Result<Waveform> {
    let mut columns = None;
    let mut data = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let row = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("第 {} 行: 无法解析数值 {:?}", lineno + 1, field))
            })
            .collect::<Result<Vec<f64>>>()?;

        match columns {
            None => columns = Some(row.len()),
            Some(n) if n != row.len() => {
                anyhow::bail!("第 {} 行: 列数 {} 与前面的 {} 不一致", lineno + 1, row.len(), n)
            },
            Some(_) => {},
        }
        data.extend(row);
    }

    let columns = columns.ok_or_else(|| anyhow::anyhow!("波形文件没有数据"))?;
    let rows = data.len() / columns;
    let shape: Vec<usize> = if columns == 1 {
        vec![rows]
    } else {
        vec![rows, columns]
    };
    Ok(Waveform::from_shape(&shape, &data)?)
}
