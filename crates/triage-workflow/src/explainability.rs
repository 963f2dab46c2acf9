//! 可解释性：模型全局特征重要性排序

use triage_core::{FeatureImportance, Result, TriageError};
use triage_model::RiskClassifier;

/// 返回权重最高的 `n` 个特征
///
/// 按权重降序排列，权重相同时保持特征声明顺序；输出权重保留四位小数。
/// 分类器不提供重要性或长度与特征名不一致时返回 `UnsupportedModel`。
pub fn top_features(
    classifier: &dyn RiskClassifier,
    feature_names: &[&str],
    n: usize,
) -> Result<Vec<FeatureImportance>> {
    let importances = classifier
        .feature_importances()
        .ok_or_else(|| TriageError::UnsupportedModel("分类器不提供特征重要性".to_string()))?;

    if importances.len() != feature_names.len() {
        return Err(TriageError::UnsupportedModel(format!(
            "特征重要性长度 {} 与特征名数量 {} 不一致",
            importances.len(),
            feature_names.len()
        )));
    }

    let mut ranked: Vec<FeatureImportance> = feature_names
        .iter()
        .zip(importances.iter())
        .map(|(name, &weight)| FeatureImportance {
            feature: name.to_string(),
            weight,
        })
        .collect();

    // sort_by 是稳定排序
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    ranked.truncate(n);
    for feature in &mut ranked {
        feature.weight = round4(feature.weight);
    }

    Ok(ranked)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
