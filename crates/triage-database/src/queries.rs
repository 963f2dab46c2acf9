//! 数据库查询操作

use crate::connection::DatabasePool;
use crate::models::*;
use triage_core::{Result, TriageError};

const VISIT_COLUMNS: &str = "id, visit_key, patient_id, timestamp, age, gender, bp, hr, temp, \
     symptom, pre_existing, risk, confidence, override_applied, department, priority, \
     hospital_load, est_wait, pdf_note";

/// 数据库查询操作接口
pub struct DatabaseQueries<'a> {
    pool: &'a DatabasePool,
}

impl<'a> DatabaseQueries<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        // 创建患者表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                patient_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            )
        "#,
        )
        .execute(pool)
        .await?;

        // 创建就诊表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                visit_key TEXT UNIQUE NOT NULL,
                patient_id TEXT NOT NULL REFERENCES patients(patient_id),
                timestamp TEXT NOT NULL,
                age INTEGER NOT NULL,
                gender TEXT NOT NULL,
                bp INTEGER NOT NULL,
                hr INTEGER NOT NULL,
                temp REAL NOT NULL,
                symptom TEXT NOT NULL,
                pre_existing TEXT NOT NULL,
                risk TEXT NOT NULL,
                confidence REAL NOT NULL,
                override_applied BOOLEAN NOT NULL,
                department TEXT NOT NULL,
                priority TEXT NOT NULL,
                hospital_load INTEGER NOT NULL,
                est_wait INTEGER NOT NULL,
                pdf_note TEXT
            )
        "#,
        )
        .execute(pool)
        .await?;

        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_visits_patient_id ON visits(patient_id)",
            "CREATE INDEX IF NOT EXISTS idx_visits_timestamp ON visits(timestamp)",
            "CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql).execute(pool).await?;
        }

        tracing::debug!("Database indexes created successfully");
        Ok(())
    }

    // ========== 就诊相关操作 ==========

    /// 写入一次就诊
    ///
    /// 幂等：相同幂等键的重复写入被忽略，返回 false。
    pub async fn record_visit(&self, visit: &NewVisit) -> Result<bool> {
        let mut tx = self.pool.pool().begin().await?;

        sqlx::query("INSERT OR IGNORE INTO patients (patient_id, created_at) VALUES (?, ?)")
            .bind(&visit.patient_id)
            .bind(&visit.timestamp)
            .execute(&mut *tx)
            .await?;

        let outcome = &visit.outcome;
        let observation = &outcome.observation;
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO visits (
                visit_key, patient_id, timestamp, age, gender, bp, hr, temp, symptom, pre_existing,
                risk, confidence, override_applied, department, priority, hospital_load, est_wait, pdf_note
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(&visit.visit_key)
        .bind(&visit.patient_id)
        .bind(&visit.timestamp)
        .bind(i64::from(observation.age))
        .bind(observation.gender.label())
        .bind(i64::from(observation.systolic_bp))
        .bind(i64::from(observation.heart_rate))
        .bind(observation.temperature_f)
        .bind(observation.symptom.label())
        .bind(observation.pre_existing.label())
        .bind(outcome.assessment.risk.label())
        .bind(outcome.assessment.confidence)
        .bind(outcome.assessment.override_applied)
        .bind(outcome.routing.department.label())
        .bind(outcome.routing.priority.label())
        .bind(i64::from(outcome.hospital_load))
        .bind(i64::from(outcome.adjusted_wait_minutes))
        .bind(&visit.note)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let inserted = result.rows_affected() == 1;
        if inserted {
            tracing::info!("Recorded visit for patient {} at {}", visit.patient_id, visit.timestamp);
        } else {
            tracing::debug!("Visit {} already recorded, skipped", visit.visit_key);
        }
        Ok(inserted)
    }

    /// 获取患者的全部就诊，最新的在前
    pub async fn get_patient_visits(&self, patient_id: &str) -> Result<Vec<VisitRecord>> {
        let sql = format!(
            "SELECT {} FROM visits WHERE patient_id = ? ORDER BY timestamp DESC, id DESC",
            VISIT_COLUMNS
        );
        let results = sqlx::query_as::<_, DbVisit>(&sql)
            .bind(patient_id)
            .fetch_all(self.pool.pool())
            .await?;

        results.into_iter().map(VisitRecord::try_from).collect()
    }

    /// 获取最近的就诊
    pub async fn get_recent_visits(&self, limit: u32) -> Result<Vec<VisitRecord>> {
        let sql = format!(
            "SELECT {} FROM visits ORDER BY timestamp DESC, id DESC LIMIT ?",
            VISIT_COLUMNS
        );
        let results = sqlx::query_as::<_, DbVisit>(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool.pool())
            .await?;

        results.into_iter().map(VisitRecord::try_from).collect()
    }

    /// 删除单次就诊
    pub async fn delete_visit(&self, patient_id: &str, timestamp: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM visits WHERE patient_id = ? AND timestamp = ?")
            .bind(patient_id)
            .bind(timestamp)
            .execute(self.pool.pool())
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("Deleted visit of patient {} at {}", patient_id, timestamp);
        }
        Ok(deleted)
    }

    // ========== 患者相关操作 ==========

    /// 列出所有患者，最新的在前
    pub async fn list_patients(&self) -> Result<Vec<PatientRecord>> {
        let results = sqlx::query_as::<_, DbPatient>(
            "SELECT patient_id, created_at FROM patients ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(results.into_iter().map(PatientRecord::from).collect())
    }

    /// 删除患者及其全部就诊记录
    ///
    /// 在同一事务中执行，返回删除的就诊数量；患者不存在时返回 `NotFound`。
    pub async fn delete_patient(&self, patient_id: &str) -> Result<u64> {
        let mut tx = self.pool.pool().begin().await?;

        let visits = sqlx::query("DELETE FROM visits WHERE patient_id = ?")
            .bind(patient_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let patients = sqlx::query("DELETE FROM patients WHERE patient_id = ?")
            .bind(patient_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if patients == 0 {
            tx.rollback().await?;
            return Err(TriageError::NotFound(format!("患者 {}", patient_id)));
        }

        tx.commit().await?;
        tracing::info!("Deleted patient {} with {} visits", patient_id, visits);
        Ok(visits)
    }
}
