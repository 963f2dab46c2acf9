//! 通用工具函数

use chrono::{DateTime, TimeZone};
use sha2::{Digest, Sha256};
use std::fmt::Display;

/// 就诊时间戳格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 生成就诊时间戳
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// 未填写患者ID时生成默认ID，形如 `PAT-20260101093000`
pub fn default_patient_id<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("PAT-{}", at.format("%Y%m%d%H%M%S"))
}

/// 规范化患者ID，空白输入返回 None
pub fn normalize_patient_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 就诊记录幂等键：sha256(患者ID | 时间戳) 的十六进制表示
pub fn visit_key(patient_id: &str, timestamp: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(patient_id.as_bytes());
    hasher.update(b"|");
    hasher.update(timestamp.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// 按字符数截断文本
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
