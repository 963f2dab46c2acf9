//! 就诊记录写入接口

use crate::connection::DatabasePool;
use crate::models::NewVisit;
use crate::queries::DatabaseQueries;
use async_trait::async_trait;
use tokio::sync::Mutex;
use triage_core::Result;

/// 就诊记录落地
///
/// 实现必须按幂等键去重：同一次就诊最多写入一次，返回值表示本次是否实际写入。
#[async_trait]
pub trait VisitSink: Send + Sync {
    async fn record(&self, visit: &NewVisit) -> Result<bool>;
}

#[async_trait]
impl VisitSink for DatabasePool {
    async fn record(&self, visit: &NewVisit) -> Result<bool> {
        DatabaseQueries::new(self).record_visit(visit).await
    }
}

/// 内存中的就诊记录，用于不接数据库的运行方式
#[derive(Debug, Default)]
pub struct MemoryVisitSink {
    visits: Mutex<Vec<NewVisit>>,
}

impl MemoryVisitSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn visits(&self) -> Vec<NewVisit> {
        self.visits.lock().await.clone()
    }
}

#[async_trait]
impl VisitSink for MemoryVisitSink {
    async fn record(&self, visit: &NewVisit) -> Result<bool> {
        let mut visits = self.visits.lock().await;
        if visits.iter().any(|v| v.visit_key == visit.visit_key) {
            return Ok(false);
        }
        visits.push(visit.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{
        Department, Gender, PatientObservation, PreExistingCondition, Priority, RiskAssessment,
        RiskLevel, RoutingDecision, Symptom,
    };
    use triage_workflow::TriageOutcome;

    fn visit(patient_id: &str, timestamp: &str) -> NewVisit {
        let outcome = TriageOutcome {
            observation: PatientObservation::new(
                65,
                Gender::Male,
                185,
                95,
                99.0,
                Symptom::Fever,
                PreExistingCondition::None,
            )
            .unwrap(),
            assessment: RiskAssessment {
                risk: RiskLevel::High,
                confidence: 1.0,
                override_applied: true,
            },
            triggered_rule: None,
            routing: RoutingDecision {
                department: Department::GeneralMedicine,
                priority: Priority::Immediate,
                base_wait_minutes: 0,
            },
            hospital_load: 80,
            adjusted_wait_minutes: 0,
            top_features: vec![],
            fairness: None,
        };
        NewVisit::new(patient_id, timestamp, outcome, None)
    }

    async fn record_twice(sink: &dyn VisitSink) -> (bool, bool) {
        let v = visit("P-9", "2026-05-01 07:15:00");
        (sink.record(&v).await.unwrap(), sink.record(&v).await.unwrap())
    }

    #[tokio::test]
    async fn test_memory_sink_is_idempotent() {
        let sink = MemoryVisitSink::new();
        assert_eq!(record_twice(&sink).await, (true, false));
        sink.record(&visit("P-9", "2026-05-01 07:16:00")).await.unwrap();
        assert_eq!(sink.visits().await.len(), 2);
    }

    #[tokio::test]
    async fn test_database_sink_is_idempotent() {
        let pool = DatabasePool::in_memory().await.unwrap();
        DatabaseQueries::new(&pool).create_tables().await.unwrap();
        assert_eq!(record_twice(&pool).await, (true, false));
        assert_eq!(DatabaseQueries::new(&pool).get_recent_visits(5).await.unwrap().len(), 1);
    }
}
