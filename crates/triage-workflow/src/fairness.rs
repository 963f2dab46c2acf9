//! 公平性审计
//!
//! 两种检查互相独立：
//! - 单个患者的性别敏感性探测：只翻转性别位，比较点预测
//! - 人群层面的高风险预测率差异

use triage_core::{FairnessProbe, Gender, PopulationFairness, Result, RiskLevel, TriageError};
use triage_model::{EncoderTable, FeatureVector, RiskClassifier, GENDER_SLOT};

/// 人群高风险率差异的容忍阈值
pub const FAIRNESS_THRESHOLD: f64 = 0.10;

/// 单个患者的性别敏感性探测
///
/// 其余特征保持不变，分别以男性和女性编码做点预测；两者不一致即标记。
pub fn audit_gender_sensitivity(
    classifier: &dyn RiskClassifier,
    encoder: &EncoderTable,
    features: &FeatureVector,
) -> Result<FairnessProbe> {
    let male_code = encoder.encode_gender(Gender::Male)? as f64;
    let female_code = encoder.encode_gender(Gender::Female)? as f64;

    let male_vector = features.with_slot(GENDER_SLOT, male_code)?;
    let female_vector = features.with_slot(GENDER_SLOT, female_code)?;

    let male_prediction = encoder.decode_risk(classifier.predict(&male_vector)?)?;
    let female_prediction = encoder.decode_risk(classifier.predict(&female_vector)?)?;
    let flagged = male_prediction != female_prediction;

    if flagged {
        tracing::warn!(
            "Gender sensitivity detected: male -> {}, female -> {}",
            male_prediction,
            female_prediction
        );
    }

    Ok(FairnessProbe {
        male_prediction,
        female_prediction,
        flagged,
    })
}

/// 人群层面的高风险预测率比较
///
/// `gender_column` 指定矩阵中性别编码所在的列。空组的比率记为 0；
/// 输出比率保留三位小数，`fair` 按未取整的差值判断。
pub fn population_fairness(
    classifier: &dyn RiskClassifier,
    encoder: &EncoderTable,
    matrix: &[FeatureVector],
    gender_column: usize,
) -> Result<PopulationFairness> {
    let male_code = encoder.encode_gender(Gender::Male)? as f64;
    let female_code = encoder.encode_gender(Gender::Female)? as f64;
    let high_code = encoder.encode_risk(RiskLevel::High)?;

    let mut male = GroupTally::default();
    let mut female = GroupTally::default();

    for row in matrix {
        let gender = row.get(gender_column)?;
        let group = if gender == male_code {
            &mut male
        } else if gender == female_code {
            &mut female
        } else {
            return Err(TriageError::UnknownCategory {
                field: "gender".to_string(),
                value: gender.to_string(),
            });
        };
        group.total += 1;
        if classifier.predict(row)? == high_code {
            group.high += 1;
        }
    }

    let male_rate = male.rate();
    let female_rate = female.rate();
    let difference = (male_rate - female_rate).abs();
    let fair = difference < FAIRNESS_THRESHOLD;

    tracing::info!(
        "Population fairness over {} rows: male {:.3}, female {:.3}, fair = {}",
        matrix.len(),
        male_rate,
        female_rate,
        fair
    );

    Ok(PopulationFairness {
        male_high_rate: round3(male_rate),
        female_high_rate: round3(female_rate),
        difference: round3(difference),
        fair,
    })
}

#[derive(Debug, Default)]
struct GroupTally {
    total: usize,
    high: usize,
}

impl GroupTally {
    fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.high as f64 / self.total as f64
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
