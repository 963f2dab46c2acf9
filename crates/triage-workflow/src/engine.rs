//! 分诊流水线
//!
//! 串联安全规则、风险分类、决策合并、科室路由、负载调整、可解释性和公平性探测

use crate::{
    combiner::decide,
    explainability::top_features,
    fairness::audit_gender_sensitivity,
    routing::RoutingEngine,
    safety_rules::{check_override, triggered_rule, SafetyRule},
    wait::{adjust_wait, LoadSampler},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::{
    FairnessProbe, FeatureImportance, PatientObservation, Result, RiskAssessment, RoutingDecision,
};
use triage_model::{classify, EncoderTable, FeatureVector, ModelArtifact, RiskClassifier, FEATURE_NAMES};

/// 默认展示的特征数量
pub const DEFAULT_TOP_FEATURES: usize = 5;

/// 一次分诊评估的完整输出
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageOutcome {
    pub observation: PatientObservation,
    pub assessment: RiskAssessment,
    pub triggered_rule: Option<SafetyRule>,
    pub routing: RoutingDecision,
    pub hospital_load: u32,
    pub adjusted_wait_minutes: u32,
    pub top_features: Vec<FeatureImportance>,
    pub fairness: Option<FairnessProbe>,
}

/// 分诊流水线
///
/// 只持有只读共享的模型和编码表，可以在多个任务间并发使用
#[derive(Clone)]
pub struct TriagePipeline {
    classifier: Arc<dyn RiskClassifier>,
    encoder: Arc<EncoderTable>,
    routing: RoutingEngine,
    top_n: usize,
}

impl TriagePipeline {
    /// 由任意分类器和与之配套的编码表创建流水线
    pub fn new(classifier: Arc<dyn RiskClassifier>, encoder: Arc<EncoderTable>) -> Self {
        Self {
            classifier,
            encoder,
            routing: RoutingEngine::new(),
            top_n: DEFAULT_TOP_FEATURES,
        }
    }

    /// 由训练工件创建流水线
    pub fn from_artifact(artifact: Arc<ModelArtifact>) -> Self {
        let encoder = Arc::new(artifact.encoder().clone());
        Self::new(artifact, encoder)
    }

    pub fn with_routing(mut self, routing: RoutingEngine) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn classifier(&self) -> &dyn RiskClassifier {
        self.classifier.as_ref()
    }

    pub fn encoder(&self) -> &EncoderTable {
        &self.encoder
    }

    /// 评估一位患者
    ///
    /// 观察数据验证失败、分类取值无法编码或分类器出错时整个评估失败；
    /// 可解释性和公平性探测失败只记录警告并从结果中省略。
    pub fn assess(&self, observation: &PatientObservation, load: &dyn LoadSampler) -> Result<TriageOutcome> {
        observation.validate()?;

        // 编码失败总是致命的，即使安全规则已经命中
        let features = FeatureVector::encode(observation, &self.encoder)?;

        let override_result = check_override(observation);
        let rule = triggered_rule(observation);

        let classifier_result = match override_result {
            Some(_) => {
                tracing::warn!(
                    "Safety override fired ({:?}), classifier skipped",
                    rule
                );
                None
            }
            None => Some(classify(self.classifier.as_ref(), &self.encoder, &features)?),
        };

        let assessment = decide(override_result, classifier_result.as_ref())?;
        let routing = self
            .routing
            .route(assessment.risk, observation.symptom, observation.pre_existing);

        let hospital_load = load.sample();
        let adjusted_wait_minutes = adjust_wait(routing.base_wait_minutes, hospital_load);

        let top_features = match top_features(self.classifier.as_ref(), &FEATURE_NAMES, self.top_n) {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!("Explainability unavailable: {}", e);
                Vec::new()
            }
        };

        let fairness = match audit_gender_sensitivity(self.classifier.as_ref(), &self.encoder, &features) {
            Ok(probe) => Some(probe),
            Err(e) => {
                tracing::warn!("Fairness probe failed: {}", e);
                None
            }
        };

        tracing::info!(
            "Assessed {} risk (confidence {:.2}, override {}), routed to {} with {} min wait at {}% load",
            assessment.risk,
            assessment.confidence,
            assessment.override_applied,
            routing.department,
            adjusted_wait_minutes,
            hospital_load
        );

        Ok(TriageOutcome {
            observation: observation.clone(),
            assessment,
            triggered_rule: rule,
            routing,
            hospital_load,
            adjusted_wait_minutes,
            top_features,
            fairness,
        })
    }
}

impl std::fmt::Debug for TriagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriagePipeline")
            .field("n_features", &self.classifier.n_features())
            .field("n_classes", &self.classifier.n_classes())
            .field("routing", &self.routing)
            .field("top_n", &self.top_n)
            .finish()
    }
}
