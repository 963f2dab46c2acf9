//! 分类特征编码表
//!
//! 与分类器同一次训练产出：每个分类字段保存一个有序的类别列表，
//! 类别在列表中的位置即为模型内部使用的整数编码。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use triage_core::{Gender, PreExistingCondition, Result, RiskLevel, Symptom, TriageError};

/// 需要编码的分类字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Gender,
    Symptom,
    PreExisting,
    Risk,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 4] = [
        CategoricalField::Gender,
        CategoricalField::Symptom,
        CategoricalField::PreExisting,
        CategoricalField::Risk,
    ];

    /// 工件中的字段名
    pub fn key(&self) -> &'static str {
        match self {
            CategoricalField::Gender => "gender",
            CategoricalField::Symptom => "symptom",
            CategoricalField::PreExisting => "pre_existing",
            CategoricalField::Risk => "risk",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 编码表
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncoderTable {
    gender: Vec<String>,
    symptom: Vec<String>,
    pre_existing: Vec<String>,
    risk: Vec<String>,
}

impl EncoderTable {
    /// 由各字段的类别列表构造并验证
    pub fn new(
        gender: Vec<String>,
        symptom: Vec<String>,
        pre_existing: Vec<String>,
        risk: Vec<String>,
    ) -> Result<Self> {
        let table = Self {
            gender,
            symptom,
            pre_existing,
            risk,
        };
        table.validate()?;
        Ok(table)
    }

    /// 获取字段的类别列表
    pub fn classes(&self, field: CategoricalField) -> &[String] {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::Symptom => &self.symptom,
            CategoricalField::PreExisting => &self.pre_existing,
            CategoricalField::Risk => &self.risk,
        }
    }

    /// 将类别字符串编码为整数
    pub fn encode(&self, field: CategoricalField, value: &str) -> Result<usize> {
        self.classes(field)
            .iter()
            .position(|class| class == value)
            .ok_or_else(|| TriageError::UnknownCategory {
                field: field.key().to_string(),
                value: value.to_string(),
            })
    }

    /// 将整数编码还原为类别字符串
    pub fn decode(&self, field: CategoricalField, code: usize) -> Result<&str> {
        self.classes(field)
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| TriageError::UnknownCategory {
                field: field.key().to_string(),
                value: code.to_string(),
            })
    }

    pub fn encode_gender(&self, gender: Gender) -> Result<usize> {
        self.encode(CategoricalField::Gender, gender.label())
    }

    pub fn encode_symptom(&self, symptom: Symptom) -> Result<usize> {
        self.encode(CategoricalField::Symptom, symptom.label())
    }

    pub fn encode_condition(&self, condition: PreExistingCondition) -> Result<usize> {
        self.encode(CategoricalField::PreExisting, condition.label())
    }

    pub fn encode_risk(&self, risk: RiskLevel) -> Result<usize> {
        self.encode(CategoricalField::Risk, risk.label())
    }

    /// 将分类器输出的类别编码还原为风险等级
    pub fn decode_risk(&self, code: usize) -> Result<RiskLevel> {
        self.decode(CategoricalField::Risk, code)?.parse()
    }

    /// 风险类别数
    pub fn risk_class_count(&self) -> usize {
        self.risk.len()
    }

    /// 验证编码表与观察数据枚举是否一致
    ///
    /// 编码表中出现了枚举无法表示的取值，或者缺少接诊表单可能提交的类别，
    /// 都视为致命的配置错误。只出现在科室映射表中的症状允许缺失。
    pub fn validate(&self) -> Result<()> {
        for field in CategoricalField::ALL {
            let classes = self.classes(field);
            if classes.is_empty() {
                return Err(TriageError::ArtifactLoad(format!("编码表字段 {} 为空", field)));
            }
            let mut seen = HashSet::new();
            for class in classes {
                if !seen.insert(class.as_str()) {
                    return Err(TriageError::ArtifactLoad(format!(
                        "编码表字段 {} 存在重复类别 {}",
                        field, class
                    )));
                }
                let parsed = match field {
                    CategoricalField::Gender => class.parse::<Gender>().map(|_| ()),
                    CategoricalField::Symptom => class.parse::<Symptom>().map(|_| ()),
                    CategoricalField::PreExisting => class.parse::<PreExistingCondition>().map(|_| ()),
                    CategoricalField::Risk => class.parse::<RiskLevel>().map(|_| ()),
                };
                parsed.map_err(|_| {
                    TriageError::ArtifactLoad(format!("编码表字段 {} 含有无法识别的类别 {}", field, class))
                })?;
            }
        }

        for gender in Gender::ALL {
            if self.encode_gender(gender).is_err() {
                return Err(TriageError::ArtifactLoad(format!("编码表缺少性别类别 {}", gender)));
            }
        }
        for symptom in Symptom::INTAKE {
            if self.encode_symptom(symptom).is_err() {
                return Err(TriageError::ArtifactLoad(format!("编码表缺少症状类别 {}", symptom)));
            }
        }
        for condition in PreExistingCondition::ALL {
            if self.encode_condition(condition).is_err() {
                return Err(TriageError::ArtifactLoad(format!("编码表缺少既往病史类别 {}", condition)));
            }
        }
        for risk in RiskLevel::ALL {
            if self.encode_risk(risk).is_err() {
                return Err(TriageError::ArtifactLoad(format!("编码表缺少风险等级 {}", risk)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_encoder() -> EncoderTable {
    let strings = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
    EncoderTable::new(
        strings(&["Female", "Male"]),
        strings(&["Chest Pain", "Cough", "Fever", "Seizure", "Severe Headache", "Shortness of Breath"]),
        strings(&["Asthma", "Diabetes", "Heart Disease", "Hypertension", "None"]),
        strings(&["High", "Low", "Medium"]),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let table = sample_encoder();
        assert_eq!(table.encode_gender(Gender::Male).unwrap(), 1);
        assert_eq!(table.encode_symptom(Symptom::Cough).unwrap(), 1);
        assert_eq!(table.encode_condition(PreExistingCondition::None).unwrap(), 4);
        assert_eq!(table.decode_risk(0).unwrap(), RiskLevel::High);
        assert_eq!(table.decode(CategoricalField::Symptom, 5).unwrap(), "Shortness of Breath");
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let table = sample_encoder();
        let err = table.encode_symptom(Symptom::HeadInjury).unwrap_err();
        match err {
            TriageError::UnknownCategory { field, value } => {
                assert_eq!(field, "symptom");
                assert_eq!(value, "Head Injury");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(table.decode_risk(7).is_err());
    }

    #[test]
    fn test_validation_rejects_mismatched_tables() {
        let strings = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();

        let symptoms = ["Chest Pain", "Cough", "Fever", "Seizure", "Severe Headache", "Shortness of Breath"];
        let conditions = ["Asthma", "Diabetes", "Heart Disease", "Hypertension", "None"];

        let missing_risk = EncoderTable::new(
            strings(&["Female", "Male"]),
            strings(&symptoms),
            strings(&conditions),
            strings(&["High", "Low"]),
        );
        assert!(matches!(missing_risk, Err(TriageError::ArtifactLoad(_))));

        let foreign_value = EncoderTable::new(
            strings(&["Female", "Male", "Unknown"]),
            strings(&symptoms),
            strings(&conditions),
            strings(&["High", "Low", "Medium"]),
        );
        assert!(foreign_value.is_err());

        let duplicated = EncoderTable::new(
            strings(&["Female", "Male"]),
            strings(&["Cough", "Cough"]),
            strings(&conditions),
            strings(&["High", "Low", "Medium"]),
        );
        assert!(duplicated.is_err());
    }

    #[test]
    fn test_validation_requires_intake_categories() {
        let strings = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        let genders = ["Female", "Male"];
        let risks = ["High", "Low", "Medium"];

        let missing_symptom = EncoderTable::new(
            strings(&genders),
            strings(&["Chest Pain", "Cough", "Fever", "Seizure", "Shortness of Breath"]),
            strings(&["Asthma", "Diabetes", "Heart Disease", "Hypertension", "None"]),
            strings(&risks),
        );
        assert!(matches!(missing_symptom, Err(TriageError::ArtifactLoad(_))));

        let missing_condition = EncoderTable::new(
            strings(&genders),
            strings(&["Chest Pain", "Cough", "Fever", "Seizure", "Severe Headache", "Shortness of Breath"]),
            strings(&["Diabetes", "Heart Disease", "Hypertension", "None"]),
            strings(&risks),
        );
        assert!(matches!(missing_condition, Err(TriageError::ArtifactLoad(_))));

        // 仅用于科室映射的症状可以缺失，也可以出现
        let with_routing_only = EncoderTable::new(
            strings(&genders),
            strings(&["Chest Pain", "Cough", "Fever", "Head Injury", "Seizure", "Severe Headache", "Shortness of Breath"]),
            strings(&["Asthma", "Diabetes", "Heart Disease", "Hypertension", "None"]),
            strings(&risks),
        );
        assert!(with_routing_only.is_ok());
    }
}
