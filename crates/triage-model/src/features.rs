//! 特征向量构造

use crate::encoder::EncoderTable;
use serde::{Deserialize, Serialize};
use triage_core::{PatientObservation, Result, TriageError};

/// 特征数量
pub const FEATURE_COUNT: usize = 7;

/// 特征名称，顺序与训练时的列顺序一致
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["age", "gender", "bp", "hr", "temp", "symptom", "pre_existing"];

pub const AGE_SLOT: usize = 0;
pub const GENDER_SLOT: usize = 1;
pub const BP_SLOT: usize = 2;
pub const HR_SLOT: usize = 3;
pub const TEMP_SLOT: usize = 4;
pub const SYMPTOM_SLOT: usize = 5;
pub const PRE_EXISTING_SLOT: usize = 6;

/// 编码后的特征向量
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    /// 通过编码表将观察数据编码为特征向量
    ///
    /// 任一分类取值不在编码表中都会返回 `UnknownCategory`，不会回退到默认编码。
    pub fn encode(observation: &PatientObservation, encoder: &EncoderTable) -> Result<Self> {
        let gender = encoder.encode_gender(observation.gender)?;
        let symptom = encoder.encode_symptom(observation.symptom)?;
        let pre_existing = encoder.encode_condition(observation.pre_existing)?;

        let mut values = [0.0; FEATURE_COUNT];
        values[AGE_SLOT] = f64::from(observation.age);
        values[GENDER_SLOT] = gender as f64;
        values[BP_SLOT] = f64::from(observation.systolic_bp);
        values[HR_SLOT] = f64::from(observation.heart_rate);
        values[TEMP_SLOT] = observation.temperature_f;
        values[SYMPTOM_SLOT] = symptom as f64;
        values[PRE_EXISTING_SLOT] = pre_existing as f64;

        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// 读取指定位置的特征值
    pub fn get(&self, slot: usize) -> Result<f64> {
        self.0
            .get(slot)
            .copied()
            .ok_or_else(|| TriageError::Classification(format!("特征位置 {} 越界", slot)))
    }

    /// 返回替换了指定位置取值的新向量
    pub fn with_slot(&self, slot: usize, value: f64) -> Result<Self> {
        let mut values = self.0;
        let target = values
            .get_mut(slot)
            .ok_or_else(|| TriageError::Classification(format!("特征位置 {} 越界", slot)))?;
        *target = value;
        Ok(Self(values))
    }
}
