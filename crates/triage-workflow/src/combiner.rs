//! 决策合并
//!
//! 安全规则结果严格优先于分类器结果。

use triage_core::{Result, RiskAssessment, RiskLevel, TriageError};
use triage_model::ClassifierOutcome;

/// 合并安全覆盖结果与分类器结果
///
/// 覆盖存在时置信度固定为 1.0，分类器结果即使已经计算也不会影响输出。
pub fn decide(
    override_result: Option<RiskLevel>,
    classifier_result: Option<&ClassifierOutcome>,
) -> Result<RiskAssessment> {
    if let Some(risk) = override_result {
        return Ok(RiskAssessment {
            risk,
            confidence: 1.0,
            override_applied: true,
        });
    }

    let outcome = classifier_result.ok_or_else(|| {
        TriageError::Classification("没有安全覆盖时必须提供分类器结果".to_string())
    })?;

    if !outcome.confidence.is_finite() {
        return Err(TriageError::Classification("分类器置信度不是有限值".to_string()));
    }

    Ok(RiskAssessment {
        risk: outcome.label,
        confidence: outcome.confidence.clamp(0.0, 1.0),
        override_applied: false,
    })
}
