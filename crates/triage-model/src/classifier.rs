//! 风险分类器能力接口
//!
//! 决策合并、可解释性和公平性检查只依赖这里的 trait，
//! 任何满足该接口的模型（包括测试中的桩模型）都可以接入流水线。

use crate::encoder::EncoderTable;
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use triage_core::{Result, RiskLevel, TriageError};

/// 风险分类器
pub trait RiskClassifier: Send + Sync {
    /// 模型期望的特征数
    fn n_features(&self) -> usize;

    /// 输出类别数
    fn n_classes(&self) -> usize;

    /// 各类别的概率分布，下标为风险标签的编码
    fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>>;

    /// 点预测，返回风险标签编码
    fn predict(&self, features: &FeatureVector) -> Result<usize> {
        let probabilities = self.predict_probabilities(features)?;
        argmax(&probabilities)
            .ok_or_else(|| TriageError::Classification("分类器返回了空的概率分布".to_string()))
    }

    /// 与特征顺序对齐的重要性权重；模型不支持时返回 None
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

/// 第一个最大值的下标
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// 分类器输出
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierOutcome {
    pub label: RiskLevel,
    pub confidence: f64,
    pub probabilities: Vec<f64>,
}

/// 运行分类器并将结果解码为风险等级
pub fn classify(
    classifier: &dyn RiskClassifier,
    encoder: &EncoderTable,
    features: &FeatureVector,
) -> Result<ClassifierOutcome> {
    let probabilities = classifier.predict_probabilities(features)?;

    if probabilities.len() != encoder.risk_class_count() {
        return Err(TriageError::Classification(format!(
            "概率分布长度 {} 与风险类别数 {} 不一致",
            probabilities.len(),
            encoder.risk_class_count()
        )));
    }
    if probabilities.iter().any(|p| !p.is_finite()) {
        return Err(TriageError::Classification("概率分布包含非有限值".to_string()));
    }

    // 标签和置信度取自同一个分布，只遍历一次模型
    let code = argmax(&probabilities)
        .ok_or_else(|| TriageError::Classification("分类器返回了空的概率分布".to_string()))?;
    let label = encoder.decode_risk(code)?;
    let confidence = probabilities[code].clamp(0.0, 1.0);

    tracing::debug!("Classifier predicted {} with confidence {:.3}", label, confidence);

    Ok(ClassifierOutcome {
        label,
        confidence,
        probabilities,
    })
}
