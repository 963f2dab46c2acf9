//! 既往病历文本的生命体征提取
//!
//! 尽力而为的提示信息：提取结果只用于展示，永远不会替代结构化的观察数据。

use regex::Regex;
use serde::{Deserialize, Serialize};
use triage_core::{Result, TriageError};

/// 从文本中识别出的生命体征
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedVitals {
    pub systolic_bp: Option<u32>,
    pub diastolic_bp: Option<u32>,
    pub heart_rate: Option<u32>,
    pub temperature_f: Option<f64>,
}

impl ExtractedVitals {
    pub fn is_empty(&self) -> bool {
        self.systolic_bp.is_none() && self.heart_rate.is_none() && self.temperature_f.is_none()
    }

    /// 单行摘要，例如 `BP: 120/80  |  HR: 88  |  Temp: 99.1`
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let (Some(systolic), Some(diastolic)) = (self.systolic_bp, self.diastolic_bp) {
            parts.push(format!("BP: {}/{}", systolic, diastolic));
        }
        if let Some(hr) = self.heart_rate {
            parts.push(format!("HR: {}", hr));
        }
        if let Some(temp) = self.temperature_f {
            parts.push(format!("Temp: {}", temp));
        }
        parts.join("  |  ")
    }
}

/// 生命体征提取器
#[derive(Debug, Clone)]
pub struct VitalsExtractor {
    blood_pressure: Regex,
    heart_rate: Regex,
    temperature: Regex,
}

impl VitalsExtractor {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| TriageError::Config(format!("正则表达式无效: {}", e)))
        };

        Ok(Self {
            blood_pressure: compile(r"(\d{2,3})\s*/\s*(\d{2,3})")?,
            heart_rate: compile(r"(?i)(heart\s*rate|hr)\s*[:\-]?\s*(\d{2,3})")?,
            temperature: compile(r"(?i)(temperature|temp)\s*[:\-]?\s*(\d{2,3}(?:\.\d+)?)")?,
        })
    }

    /// 提取文本中第一次出现的各项生命体征
    pub fn extract(&self, text: &str) -> ExtractedVitals {
        let mut vitals = ExtractedVitals::default();

        if let Some(caps) = self.blood_pressure.captures(text) {
            vitals.systolic_bp = caps.get(1).and_then(|m| m.as_str().parse().ok());
            vitals.diastolic_bp = caps.get(2).and_then(|m| m.as_str().parse().ok());
        }
        if let Some(caps) = self.heart_rate.captures(text) {
            vitals.heart_rate = caps.get(2).and_then(|m| m.as_str().parse().ok());
        }
        if let Some(caps) = self.temperature.captures(text) {
            vitals.temperature_f = caps.get(2).and_then(|m| m.as_str().parse().ok());
        }

        if vitals.is_empty() {
            tracing::debug!("No vitals detected in {} chars of text", text.len());
        } else {
            tracing::info!("Detected from document (best-effort): {}", vitals.summary());
        }
        vitals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_all_vitals() {
        let extractor = VitalsExtractor::new().unwrap();
        let text = "Discharge summary\nBP 120 / 80 mmHg\nHR: 88 bpm\nTemp - 99.1 F";
        let vitals = extractor.extract(text);
        assert_eq!(vitals.systolic_bp, Some(120));
        assert_eq!(vitals.diastolic_bp, Some(80));
        assert_eq!(vitals.heart_rate, Some(88));
        assert_eq!(vitals.temperature_f, Some(99.1));
        assert_eq!(vitals.summary(), "BP: 120/80  |  HR: 88  |  Temp: 99.1");
    }

    #[test]
    fn test_case_insensitive_labels() {
        let extractor = VitalsExtractor::new().unwrap();
        let vitals = extractor.extract("heart rate 102, TEMPERATURE: 101");
        assert_eq!(vitals.heart_rate, Some(102));
        assert_eq!(vitals.temperature_f, Some(101.0));
        assert_eq!(vitals.systolic_bp, None);
    }

    #[test]
    fn test_no_vitals() {
        let extractor = VitalsExtractor::new().unwrap();
        let vitals = extractor.extract("Patient reports mild cough for two days.");
        assert!(vitals.is_empty());
        assert_eq!(vitals.summary(), "");
    }
}
