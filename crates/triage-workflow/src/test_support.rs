//! 测试辅助：桩分类器、编码表和观察数据生成

use proptest::prelude::*;
use triage_core::{Gender, PatientObservation, PreExistingCondition, Result, Symptom};
use triage_model::{EncoderTable, FeatureVector, RiskClassifier, FEATURE_COUNT, GENDER_SLOT};

pub fn observation(
    age: u32,
    bp: u32,
    hr: u32,
    temp: f64,
    symptom: Symptom,
    condition: PreExistingCondition,
) -> PatientObservation {
    PatientObservation::new(age, Gender::Male, bp, hr, temp, symptom, condition).unwrap()
}

/// 训练时 LabelEncoder 产出的编码表（类别按字母序）
pub fn encoder() -> EncoderTable {
    let strings = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
    EncoderTable::new(
        strings(&["Female", "Male"]),
        strings(&["Chest Pain", "Cough", "Fever", "Seizure", "Severe Headache", "Shortness of Breath"]),
        strings(&["Asthma", "Diabetes", "Heart Disease", "Hypertension", "None"]),
        strings(&["High", "Low", "Medium"]),
    )
    .unwrap()
}

/// 固定输出分布的桩分类器
pub struct FixedClassifier {
    pub probabilities: Vec<f64>,
    pub importances: Option<Vec<f64>>,
}

impl FixedClassifier {
    pub fn new(probabilities: &[f64]) -> Self {
        Self {
            probabilities: probabilities.to_vec(),
            importances: None,
        }
    }

    pub fn with_importances(mut self, importances: &[f64]) -> Self {
        self.importances = Some(importances.to_vec());
        self
    }
}

impl RiskClassifier for FixedClassifier {
    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn n_classes(&self) -> usize {
        self.probabilities.len()
    }

    fn predict_probabilities(&self, _features: &FeatureVector) -> Result<Vec<f64>> {
        Ok(self.probabilities.clone())
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }
}

/// 只看性别位的桩分类器：男性编码预测 `male_code`，否则预测 `female_code`
pub struct GenderSensitiveClassifier {
    pub male_value: f64,
    pub male_code: usize,
    pub female_code: usize,
}

impl RiskClassifier for GenderSensitiveClassifier {
    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn n_classes(&self) -> usize {
        3
    }

    fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let code = if features.get(GENDER_SLOT)? == self.male_value {
            self.male_code
        } else {
            self.female_code
        };
        let mut probabilities = vec![0.0; 3];
        probabilities[code] = 1.0;
        Ok(probabilities)
    }
}

/// 取值域内的任意观察数据
pub fn arbitrary_observation() -> impl Strategy<Value = PatientObservation> {
    (
        0u32..=130,
        prop::sample::select(Gender::ALL.to_vec()),
        40u32..=300,
        20u32..=250,
        80.0f64..=115.0,
        prop::sample::select(Symptom::ALL.to_vec()),
        prop::sample::select(PreExistingCondition::ALL.to_vec()),
    )
        .prop_map(|(age, gender, systolic_bp, heart_rate, temperature_f, symptom, pre_existing)| {
            PatientObservation {
                age,
                gender,
                systolic_bp,
                heart_rate,
                temperature_f,
                symptom,
                pre_existing,
            }
        })
}
