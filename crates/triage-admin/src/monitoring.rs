//! 分诊指标
//!
//! 使用独立的 Prometheus 注册表，按需导出文本格式

use anyhow::Result;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use tracing::debug;
use triage_workflow::TriageOutcome;

/// 等待时间直方图的分桶（分钟）
const WAIT_BUCKETS: [f64; 8] = [0.0, 5.0, 15.0, 22.0, 30.0, 45.0, 60.0, 120.0];

/// 分诊指标收集器
#[derive(Clone)]
pub struct TriageMetrics {
    /// Prometheus指标注册表
    registry: Registry,
    /// 评估总数
    assessments_total: IntCounter,
    /// 评估失败数
    assessment_failures_total: IntCounter,
    /// 安全覆盖次数
    safety_overrides_total: IntCounter,
    /// 公平性探测标记次数
    fairness_flags_total: IntCounter,
    /// 按风险等级统计
    risk_levels_total: IntCounterVec,
    /// 调整后等待时间分布
    adjusted_wait_minutes: Histogram,
}

impl TriageMetrics {
    /// 创建新的指标收集器
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let assessments_total = IntCounter::with_opts(Opts::new(
            "triage_assessments_total",
            "Total number of completed triage assessments",
        ))?;

        let assessment_failures_total = IntCounter::with_opts(Opts::new(
            "triage_assessment_failures_total",
            "Total number of triage assessments that failed",
        ))?;

        let safety_overrides_total = IntCounter::with_opts(Opts::new(
            "triage_safety_overrides_total",
            "Total number of assessments decided by a safety rule",
        ))?;

        let fairness_flags_total = IntCounter::with_opts(Opts::new(
            "triage_fairness_flags_total",
            "Total number of assessments flagged by the gender sensitivity probe",
        ))?;

        let risk_levels_total = IntCounterVec::new(
            Opts::new("triage_risk_levels_total", "Assessments by final risk level"),
            &["risk"],
        )?;

        let adjusted_wait_minutes = Histogram::with_opts(
            HistogramOpts::new(
                "triage_adjusted_wait_minutes",
                "Load-adjusted estimated wait time in minutes",
            )
            .buckets(WAIT_BUCKETS.to_vec()),
        )?;

        // 注册所有指标
        registry.register(Box::new(assessments_total.clone()))?;
        registry.register(Box::new(assessment_failures_total.clone()))?;
        registry.register(Box::new(safety_overrides_total.clone()))?;
        registry.register(Box::new(fairness_flags_total.clone()))?;
        registry.register(Box::new(risk_levels_total.clone()))?;
        registry.register(Box::new(adjusted_wait_minutes.clone()))?;

        Ok(Self {
            registry,
            assessments_total,
            assessment_failures_total,
            safety_overrides_total,
            fairness_flags_total,
            risk_levels_total,
            adjusted_wait_minutes,
        })
    }

    /// 记录一次成功的评估
    pub fn record_outcome(&self, outcome: &TriageOutcome) {
        debug!(
            "Recording metrics for {} risk assessment",
            outcome.assessment.risk
        );

        self.assessments_total.inc();
        if outcome.assessment.override_applied {
            self.safety_overrides_total.inc();
        }
        if outcome.fairness.as_ref().is_some_and(|probe| probe.flagged) {
            self.fairness_flags_total.inc();
        }
        self.risk_levels_total
            .with_label_values(&[outcome.assessment.risk.label()])
            .inc();
        self.adjusted_wait_minutes
            .observe(f64::from(outcome.adjusted_wait_minutes));
    }

    /// 记录一次失败的评估
    pub fn record_failure(&self) {
        self.assessment_failures_total.inc();
    }

    pub fn assessments(&self) -> u64 {
        self.assessments_total.get()
    }

    pub fn safety_overrides(&self) -> u64 {
        self.safety_overrides_total.get()
    }

    /// 获取Prometheus指标
    pub fn get_prometheus_metrics(&self) -> Result<String> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

impl std::fmt::Debug for TriageMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageMetrics")
            .field("assessments_total", &self.assessments_total.get())
            .field("assessment_failures_total", &self.assessment_failures_total.get())
            .field("safety_overrides_total", &self.safety_overrides_total.get())
            .field("fairness_flags_total", &self.fairness_flags_total.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{
        Department, FairnessProbe, Gender, PatientObservation, PreExistingCondition, Priority,
        RiskAssessment, RiskLevel, RoutingDecision, Symptom,
    };

    fn outcome(risk: RiskLevel, override_applied: bool, flagged: bool, wait: u32) -> TriageOutcome {
        TriageOutcome {
            observation: PatientObservation::new(
                30,
                Gender::Male,
                120,
                80,
                98.6,
                Symptom::Cough,
                PreExistingCondition::None,
            )
            .unwrap(),
            assessment: RiskAssessment {
                risk,
                confidence: 0.8,
                override_applied,
            },
            triggered_rule: None,
            routing: RoutingDecision {
                department: Department::GeneralMedicine,
                priority: Priority::Standard,
                base_wait_minutes: 30,
            },
            hospital_load: 50,
            adjusted_wait_minutes: wait,
            top_features: vec![],
            fairness: Some(FairnessProbe {
                male_prediction: risk,
                female_prediction: risk,
                flagged,
            }),
        }
    }

    #[test]
    fn test_counters() {
        let metrics = TriageMetrics::new().unwrap();
        metrics.record_outcome(&outcome(RiskLevel::Low, false, false, 45));
        metrics.record_outcome(&outcome(RiskLevel::High, true, true, 0));
        metrics.record_failure();

        assert_eq!(metrics.assessments(), 2);
        assert_eq!(metrics.safety_overrides(), 1);

        let text = metrics.get_prometheus_metrics().unwrap();
        assert!(text.contains("triage_assessments_total 2"));
        assert!(text.contains("triage_assessment_failures_total 1"));
        assert!(text.contains("triage_fairness_flags_total 1"));
        assert!(text.contains("triage_risk_levels_total{risk=\"High\"} 1"));
        assert!(text.contains("triage_adjusted_wait_minutes_count 2"));
    }
}
