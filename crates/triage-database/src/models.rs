//! 数据库模型

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use triage_core::utils::{truncate_chars, visit_key};
use triage_core::{
    Department, Gender, PreExistingCondition, Priority, Result, RiskLevel, Symptom, TriageError,
};
use triage_workflow::TriageOutcome;

/// 报告备注的最大保存长度（字符）
pub const MAX_NOTE_CHARS: usize = 2000;

// 数据库表模型 - 使用FromRow trait用于SQL查询

/// 数据库患者表
#[derive(Debug, FromRow)]
pub struct DbPatient {
    pub patient_id: String,
    pub created_at: String,
}

/// 数据库就诊表
#[derive(Debug, FromRow)]
pub struct DbVisit {
    pub id: i64,
    pub visit_key: String,
    pub patient_id: String,
    pub timestamp: String,
    pub age: i64,
    pub gender: String,
    pub bp: i64,
    pub hr: i64,
    pub temp: f64,
    pub symptom: String,
    pub pre_existing: String,
    pub risk: String,
    pub confidence: f64,
    pub override_applied: bool,
    pub department: String,
    pub priority: String,
    pub hospital_load: i64,
    pub est_wait: i64,
    pub pdf_note: Option<String>,
}

/// 患者记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRecord {
    pub patient_id: String,
    pub created_at: String,
}

impl From<DbPatient> for PatientRecord {
    fn from(db_patient: DbPatient) -> Self {
        PatientRecord {
            patient_id: db_patient.patient_id,
            created_at: db_patient.created_at,
        }
    }
}

/// 就诊记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitRecord {
    pub id: i64,
    pub patient_id: String,
    pub timestamp: String,
    pub age: u32,
    pub gender: Gender,
    pub systolic_bp: u32,
    pub heart_rate: u32,
    pub temperature_f: f64,
    pub symptom: Symptom,
    pub pre_existing: PreExistingCondition,
    pub risk: RiskLevel,
    pub confidence: f64,
    pub override_applied: bool,
    pub department: Department,
    pub priority: Priority,
    pub hospital_load: u32,
    pub estimated_wait_minutes: u32,
    pub note: Option<String>,
}

fn column_u32(name: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| TriageError::Database(format!("列 {} 的取值 {} 超出范围", name, value)))
}

fn column_label<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| TriageError::Database(format!("列 {} 含有无法识别的取值 {}", name, value)))
}

impl TryFrom<DbVisit> for VisitRecord {
    type Error = TriageError;

    fn try_from(db_visit: DbVisit) -> Result<Self> {
        Ok(VisitRecord {
            id: db_visit.id,
            age: column_u32("age", db_visit.age)?,
            gender: column_label("gender", &db_visit.gender)?,
            systolic_bp: column_u32("bp", db_visit.bp)?,
            heart_rate: column_u32("hr", db_visit.hr)?,
            temperature_f: db_visit.temp,
            symptom: column_label("symptom", &db_visit.symptom)?,
            pre_existing: column_label("pre_existing", &db_visit.pre_existing)?,
            risk: column_label("risk", &db_visit.risk)?,
            confidence: db_visit.confidence,
            override_applied: db_visit.override_applied,
            department: column_label("department", &db_visit.department)?,
            priority: column_label("priority", &db_visit.priority)?,
            hospital_load: column_u32("hospital_load", db_visit.hospital_load)?,
            estimated_wait_minutes: column_u32("est_wait", db_visit.est_wait)?,
            patient_id: db_visit.patient_id,
            timestamp: db_visit.timestamp,
            note: db_visit.pdf_note,
        })
    }
}

/// 待写入的就诊记录
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
    pub visit_key: String,
    pub patient_id: String,
    pub timestamp: String,
    pub outcome: TriageOutcome,
    pub note: Option<String>,
}

impl NewVisit {
    /// 由评估结果构造就诊记录，备注超长部分被截断
    pub fn new(
        patient_id: impl Into<String>,
        timestamp: impl Into<String>,
        outcome: TriageOutcome,
        note: Option<&str>,
    ) -> Self {
        let patient_id = patient_id.into();
        let timestamp = timestamp.into();
        Self {
            visit_key: visit_key(&patient_id, &timestamp),
            note: note.map(|text| truncate_chars(text, MAX_NOTE_CHARS)),
            patient_id,
            timestamp,
            outcome,
        }
    }
}
