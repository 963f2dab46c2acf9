//! 子命令实现

use crate::AssessArgs;
use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;
use triage_admin::{TriageConfig, TriageMetrics};
use triage_core::utils::{default_patient_id, format_timestamp, normalize_patient_id};
use triage_core::PatientObservation;
use triage_database::{DatabasePool, DatabaseQueries, NewVisit, VisitRecord, VisitSink};
use triage_integration::{Language, ReportRenderer, TriageReport, VitalsExtractor};
use triage_model::{ArtifactStore, FeatureVector, ModelArtifact, SyntheticCohort, FEATURE_NAMES, GENDER_SLOT};
use triage_workflow::{
    population_fairness, top_features, FixedLoad, LoadSampler, TriagePipeline, UniformLoadSampler,
};

fn load_artifact(config: &TriageConfig) -> Result<Arc<ModelArtifact>> {
    let store = ArtifactStore::open(&config.model.artifact_path)
        .with_context(|| format!("Failed to load model artifact {}", config.model.artifact_path))?;
    Ok(store.current())
}

fn build_pipeline(config: &TriageConfig) -> Result<TriagePipeline> {
    Ok(TriagePipeline::from_artifact(load_artifact(config)?).with_top_n(config.pipeline.top_features))
}

fn build_sampler(config: &TriageConfig, load: Option<u32>) -> Result<Box<dyn LoadSampler>> {
    if let Some(load) = load.or(config.pipeline.fixed_load) {
        if load > 100 {
            anyhow::bail!("Hospital load {} exceeds 100", load);
        }
        return Ok(Box::new(FixedLoad(load)));
    }
    let sampler = UniformLoadSampler::new(config.pipeline.min_load, config.pipeline.max_load)?;
    Ok(Box::new(sampler))
}

async fn open_database(config: &TriageConfig) -> Result<DatabasePool> {
    let pool = DatabasePool::connect(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    DatabaseQueries::new(&pool).create_tables().await?;
    Ok(pool)
}

fn print_visits(visits: &[VisitRecord]) {
    if visits.is_empty() {
        println!("No visits found");
        return;
    }
    for visit in visits {
        println!(
            "{}  {:<20} {:<6} {:>5.1}%  {:<18} {:<9} wait {:>3} min  override {}",
            visit.timestamp,
            visit.patient_id,
            visit.risk.label(),
            visit.confidence * 100.0,
            visit.department.label(),
            visit.priority.label(),
            visit.estimated_wait_minutes,
            if visit.override_applied { "YES" } else { "NO" }
        );
    }
}

/// 评估一位患者
pub async fn assess(config: &TriageConfig, args: AssessArgs) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let sampler = build_sampler(config, args.load)?;
    let metrics = TriageMetrics::new()?;

    let observation = PatientObservation::new(
        args.age,
        args.gender,
        args.bp,
        args.hr,
        args.temp,
        args.symptom,
        args.condition,
    )?;

    let note = match &args.notes {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read notes {}", path.display()))?;
            let vitals = VitalsExtractor::new()?.extract(&text);
            if !vitals.is_empty() {
                println!("Detected from notes (best-effort): {}", vitals.summary());
            }
            Some(text)
        }
        None => None,
    };

    let outcome = match pipeline.assess(&observation, sampler.as_ref()) {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics.record_failure();
            return Err(e.into());
        }
    };
    metrics.record_outcome(&outcome);

    let now = Local::now();
    let patient_id = normalize_patient_id(&args.patient_id).unwrap_or_else(|| default_patient_id(&now));
    let timestamp = format_timestamp(&now);

    if !args.no_save {
        let pool = open_database(config).await?;
        let visit = NewVisit::new(&patient_id, &timestamp, outcome.clone(), note.as_deref());
        if !pool.record(&visit).await? {
            tracing::warn!("Visit for {} at {} was already recorded", patient_id, timestamp);
        }
        pool.close().await;
    }

    let report = TriageReport::new(patient_id, timestamp, outcome);
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        let language: Language = args
            .language
            .as_deref()
            .unwrap_or(config.pipeline.language.as_str())
            .parse()?;
        let renderer = ReportRenderer::new(config.pipeline.report_lines_per_page)?.with_language(language);
        println!("{}", renderer.render_text(&report));
    }
    Ok(())
}

/// 患者就诊历史
pub async fn history(config: &TriageConfig, patient_id: &str) -> Result<()> {
    let pool = open_database(config).await?;
    let visits = DatabaseQueries::new(&pool).get_patient_visits(patient_id).await?;
    print_visits(&visits);
    Ok(())
}

/// 最近就诊
pub async fn recent(config: &TriageConfig, limit: u32) -> Result<()> {
    let pool = open_database(config).await?;
    let visits = DatabaseQueries::new(&pool).get_recent_visits(limit).await?;
    print_visits(&visits);
    Ok(())
}

/// 列出患者
pub async fn patients(config: &TriageConfig) -> Result<()> {
    let pool = open_database(config).await?;
    let patients = DatabaseQueries::new(&pool).list_patients().await?;
    if patients.is_empty() {
        println!("No patients found");
    }
    for patient in patients {
        println!("{}  {}", patient.created_at, patient.patient_id);
    }
    Ok(())
}

/// 删除患者
pub async fn delete_patient(config: &TriageConfig, patient_id: &str) -> Result<()> {
    let pool = open_database(config).await?;
    let removed = DatabaseQueries::new(&pool).delete_patient(patient_id).await?;
    println!("Deleted patient {} and {} visits", patient_id, removed);
    Ok(())
}

/// 删除单次就诊
pub async fn delete_visit(config: &TriageConfig, patient_id: &str, timestamp: &str) -> Result<()> {
    let pool = open_database(config).await?;
    if DatabaseQueries::new(&pool).delete_visit(patient_id, timestamp).await? {
        println!("Deleted visit of {} at {}", patient_id, timestamp);
    } else {
        println!("No visit of {} at {}", patient_id, timestamp);
    }
    Ok(())
}

/// 编码合成队列，跳过编码表不认识的记录
fn encode_cohort(artifact: &ModelArtifact, size: usize, seed: u64) -> Vec<(PatientObservation, FeatureVector)> {
    SyntheticCohort::new(seed)
        .generate(size)
        .into_iter()
        .filter_map(|record| match FeatureVector::encode(&record.observation, artifact.encoder()) {
            Ok(vector) => Some((record.observation, vector)),
            Err(e) => {
                tracing::warn!("Skipping synthetic record {}: {}", record.patient_id, e);
                None
            }
        })
        .collect()
}

/// 人群公平性审计
pub fn audit(config: &TriageConfig, size: usize, seed: u64) -> Result<()> {
    let artifact = load_artifact(config)?;
    let matrix: Vec<FeatureVector> = encode_cohort(&artifact, size, seed)
        .into_iter()
        .map(|(_, vector)| vector)
        .collect();

    let report = population_fairness(artifact.as_ref(), artifact.encoder(), &matrix, GENDER_SLOT)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// 模型主要特征
pub fn explain(config: &TriageConfig, top: Option<usize>) -> Result<()> {
    let artifact = load_artifact(config)?;
    let n = top.unwrap_or(config.pipeline.top_features);
    let features = top_features(artifact.as_ref(), &FEATURE_NAMES, n)?;
    for (rank, feature) in features.iter().enumerate() {
        println!("{}. {:<14} {:.3}", rank + 1, feature.feature.to_uppercase(), feature.weight);
    }
    Ok(())
}

/// 合成队列上的流水线指标
pub fn metrics(config: &TriageConfig, size: usize, seed: u64) -> Result<()> {
    let artifact = load_artifact(config)?;
    let pipeline = TriagePipeline::from_artifact(Arc::clone(&artifact)).with_top_n(config.pipeline.top_features);
    let sampler = build_sampler(config, None)?;
    let metrics = TriageMetrics::new()?;

    for (observation, _) in encode_cohort(&artifact, size, seed) {
        match pipeline.assess(&observation, sampler.as_ref()) {
            Ok(outcome) => metrics.record_outcome(&outcome),
            Err(e) => {
                tracing::warn!("Assessment failed: {}", e);
                metrics.record_failure();
            }
        }
    }

    print!("{}", metrics.get_prometheus_metrics()?);
    Ok(())
}
