//! # 分诊集成模块
//!
//! 提供与系统外部的文本交互功能，包括：
//! - 既往病历文本的生命体征提取（仅作提示）
//! - 分页纯文本与JSON格式的分诊报告
//! - 界面文本的多语言翻译

pub mod document;
pub mod i18n;
pub mod report;

pub use document::{ExtractedVitals, VitalsExtractor};
pub use i18n::{translate, Language};
pub use report::{ReportRenderer, TriageReport, DISCLAIMER, REPORT_TITLE};
