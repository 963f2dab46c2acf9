//! 分诊报告生成
//!
//! 输出两种格式：分页的纯文本文档和 JSON。

use crate::i18n::{translate, Language};
use serde::{Deserialize, Serialize};
use triage_core::{Result, TriageError};
use triage_workflow::TriageOutcome;

/// 报告标题
pub const REPORT_TITLE: &str = "TRIAGE AI - PATIENT TRIAGE REPORT";

/// 报告免责声明
pub const DISCLAIMER: &str = "Disclaimer: This report is decision-support output generated from \
     synthetic-data-trained ML + safety rules. Not a substitute for clinical judgement.";

/// 每页最少行数：页眉、页脚各占两行
pub const MIN_LINES_PER_PAGE: usize = 8;

/// 默认每页行数
pub const DEFAULT_LINES_PER_PAGE: usize = 40;

const LABEL_WIDTH: usize = 26;

/// 一次分诊的报告内容
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageReport {
    pub patient_id: String,
    pub generated_at: String,
    pub outcome: TriageOutcome,
}

impl TriageReport {
    pub fn new(patient_id: impl Into<String>, generated_at: impl Into<String>, outcome: TriageOutcome) -> Self {
        Self {
            patient_id: patient_id.into(),
            generated_at: generated_at.into(),
            outcome,
        }
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 纯文本报告渲染器
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    lines_per_page: usize,
    language: Language,
}

impl ReportRenderer {
    pub fn new(lines_per_page: usize) -> Result<Self> {
        if lines_per_page < MIN_LINES_PER_PAGE {
            return Err(TriageError::Report(format!(
                "每页行数 {} 小于最小值 {}",
                lines_per_page, MIN_LINES_PER_PAGE
            )));
        }
        Ok(Self {
            lines_per_page,
            language: Language::English,
        })
    }

    /// 设置标签语言
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    fn row(&self, label: &str, value: impl std::fmt::Display) -> String {
        let label = translate(label, self.language);
        let padding = LABEL_WIDTH.saturating_sub(label.chars().count());
        format!("  {}{}{}", label, " ".repeat(padding), value)
    }

    /// 报告正文（未分页）
    pub fn body_lines(&self, report: &TriageReport) -> Vec<String> {
        let outcome = &report.outcome;
        let observation = &outcome.observation;
        let assessment = &outcome.assessment;
        let routing = &outcome.routing;

        let patient_id = if report.patient_id.trim().is_empty() {
            "N/A"
        } else {
            report.patient_id.as_str()
        };

        let mut lines = vec![
            REPORT_TITLE.to_string(),
            format!("Generated: {}", report.generated_at),
            String::new(),
            "Patient Details".to_string(),
            self.row("Patient ID", patient_id),
            self.row("Age", observation.age),
            self.row("Gender", observation.gender),
            self.row("Symptoms", observation.symptom),
            self.row("Pre-Existing Condition", observation.pre_existing),
            String::new(),
            "Vitals".to_string(),
            self.row("Blood Pressure", observation.systolic_bp),
            self.row("Heart Rate", observation.heart_rate),
            self.row("Temperature", observation.temperature_f),
            String::new(),
            "Triage Output".to_string(),
            self.row(
                "Risk Level",
                format!(
                    "{} ({:.2}%)",
                    translate(assessment.risk.label(), self.language),
                    assessment.confidence * 100.0
                ),
            ),
            self.row("Department", routing.department),
            self.row("Priority", routing.priority),
            self.row("Hospital Load", format!("{}%", outcome.hospital_load)),
            self.row("Estimated Wait Time", format!("{} minutes", outcome.adjusted_wait_minutes)),
            self.row(
                "Safety Override",
                if assessment.override_applied { "YES" } else { "NO" },
            ),
        ];

        if let Some(rule) = outcome.triggered_rule {
            lines.push(self.row("Triggered Rule", rule.description()));
        }

        let fairness = match &outcome.fairness {
            Some(probe) if probe.flagged => "POTENTIAL BIAS",
            Some(_) => "NO BIAS FLAG",
            None => "NOT AVAILABLE",
        };
        lines.push(self.row("Fairness (Gender Toggle)", fairness));
        lines.push(String::new());

        lines.push(translate("Model Explainability", self.language).to_string());
        if outcome.top_features.is_empty() {
            lines.push("  Not available for this model".to_string());
        } else {
            for (rank, feature) in outcome.top_features.iter().enumerate() {
                lines.push(format!(
                    "  {}. {} ({:.3})",
                    rank + 1,
                    feature.feature.to_uppercase(),
                    feature.weight
                ));
            }
        }
        lines.push(String::new());
        lines.push(DISCLAIMER.to_string());

        lines
    }

    /// 分页渲染，每页带页眉和页码
    pub fn render_pages(&self, report: &TriageReport) -> Vec<String> {
        let body = self.body_lines(report);
        let content_lines = self.lines_per_page - 4;
        let chunks: Vec<&[String]> = body.chunks(content_lines).collect();
        let total = chunks.len();

        chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                let mut page = Vec::with_capacity(self.lines_per_page);
                page.push(format!("{} | {}", REPORT_TITLE, report.patient_id));
                page.push("-".repeat(REPORT_TITLE.len()));
                page.extend(chunk.iter().cloned());
                page.push(String::new());
                page.push(format!("Page {} of {}", index + 1, total));
                page.join("\n")
            })
            .collect()
    }

    /// 完整文本，页之间以换页符分隔
    pub fn render_text(&self, report: &TriageReport) -> String {
        let pages = self.render_pages(report);
        tracing::debug!("Rendered report for {} in {} pages", report.patient_id, pages.len());
        pages.join("\n\u{000C}\n")
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self {
            lines_per_page: DEFAULT_LINES_PER_PAGE,
            language: Language::English,
        }
    }
}
