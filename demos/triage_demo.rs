//! 分诊流水线演示程序
//!
//! 加载演示模型工件，依次评估一位高血压危象患者和一位轻症咳嗽患者，
//! 输出报告、主要特征和人群公平性审计。

use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use triage::core::utils::format_timestamp;
use triage::core::{Gender, PatientObservation, PreExistingCondition, Symptom};
use triage::integration::{Language, ReportRenderer, TriageReport};
use triage::model::{FeatureVector, ModelArtifact, SyntheticCohort, GENDER_SLOT};
use triage::workflow::{population_fairness, FixedLoad, TriagePipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let artifact = Arc::new(ModelArtifact::load("models/risk_model.json")?);
    let pipeline = TriagePipeline::from_artifact(Arc::clone(&artifact));
    let renderer = ReportRenderer::default();

    println!("🚑 急诊分诊流水线演示\n");

    // 1. 高血压危象：安全规则直接判定高风险
    let crisis = PatientObservation::new(
        65,
        Gender::Male,
        185,
        95,
        99.0,
        Symptom::Fever,
        PreExistingCondition::None,
    )?;
    let outcome = pipeline.assess(&crisis, &FixedLoad(70))?;
    println!(
        "📋 患者 DEMO-001: {} ({:.0}%)，覆盖规则 {:?}",
        outcome.assessment.risk,
        outcome.assessment.confidence * 100.0,
        outcome.triggered_rule
    );
    let report = TriageReport::new("DEMO-001", format_timestamp(&Local::now()), outcome);
    println!("{}\n", renderer.render_text(&report));

    // 2. 轻症咳嗽：由模型判定，负载 50% 时等待时间上浮一半
    let cough = PatientObservation::new(
        30,
        Gender::Female,
        120,
        80,
        98.6,
        Symptom::Cough,
        PreExistingCondition::None,
    )?;
    let outcome = pipeline.assess(&cough, &FixedLoad(50))?;
    println!(
        "📋 患者 DEMO-002: {} ({:.0}%)，{} / {}，等待 {} → {} 分钟",
        outcome.assessment.risk,
        outcome.assessment.confidence * 100.0,
        outcome.routing.department,
        outcome.routing.priority,
        outcome.routing.base_wait_minutes,
        outcome.adjusted_wait_minutes
    );
    let report = TriageReport::new("DEMO-002", format_timestamp(&Local::now()), outcome);
    let hindi = ReportRenderer::default().with_language(Language::Hindi);
    println!("{}\n", hindi.render_text(&report));

    // 3. 合成队列上的人群公平性审计
    let matrix: Vec<FeatureVector> = SyntheticCohort::new(42)
        .generate(300)
        .iter()
        .filter_map(|record| FeatureVector::encode(&record.observation, artifact.encoder()).ok())
        .collect();
    let fairness = population_fairness(artifact.as_ref(), artifact.encoder(), &matrix, GENDER_SLOT)?;
    println!("⚖️  人群公平性审计:");
    println!("{}", serde_json::to_string_pretty(&fairness)?);

    println!("\n🎉 演示完成");
    Ok(())
}
