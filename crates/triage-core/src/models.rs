//! 核心数据模型定义

use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 年龄取值范围（岁）
pub const AGE_RANGE: std::ops::RangeInclusive<u32> = 0..=130;
/// 收缩压取值范围（mmHg）
pub const SYSTOLIC_BP_RANGE: std::ops::RangeInclusive<u32> = 40..=300;
/// 心率取值范围（次/分）
pub const HEART_RATE_RANGE: std::ops::RangeInclusive<u32> = 20..=250;
/// 体温取值范围（华氏度）
pub const TEMPERATURE_RANGE_F: std::ops::RangeInclusive<f64> = 80.0..=115.0;

/// 性别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// 主诉症状
///
/// 前六项是接诊表单可选的症状；其余几项只出现在科室映射表中，
/// 为后续扩展接诊症状保留。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Symptom {
    #[serde(rename = "Chest Pain")]
    ChestPain,
    Seizure,
    #[serde(rename = "Shortness of Breath")]
    ShortnessOfBreath,
    #[serde(rename = "Severe Headache")]
    SevereHeadache,
    Fever,
    Cough,
    #[serde(rename = "Head Injury")]
    HeadInjury,
    #[serde(rename = "Pregnancy Complication")]
    PregnancyComplication,
    #[serde(rename = "Abdominal Pain")]
    AbdominalPain,
    Unconsciousness,
}

impl Symptom {
    pub const ALL: [Symptom; 10] = [
        Symptom::ChestPain,
        Symptom::Seizure,
        Symptom::ShortnessOfBreath,
        Symptom::SevereHeadache,
        Symptom::Fever,
        Symptom::Cough,
        Symptom::HeadInjury,
        Symptom::PregnancyComplication,
        Symptom::AbdominalPain,
        Symptom::Unconsciousness,
    ];

    /// 接诊表单提供的症状
    pub const INTAKE: [Symptom; 6] = [
        Symptom::ChestPain,
        Symptom::Seizure,
        Symptom::ShortnessOfBreath,
        Symptom::SevereHeadache,
        Symptom::Fever,
        Symptom::Cough,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Symptom::ChestPain => "Chest Pain",
            Symptom::Seizure => "Seizure",
            Symptom::ShortnessOfBreath => "Shortness of Breath",
            Symptom::SevereHeadache => "Severe Headache",
            Symptom::Fever => "Fever",
            Symptom::Cough => "Cough",
            Symptom::HeadInjury => "Head Injury",
            Symptom::PregnancyComplication => "Pregnancy Complication",
            Symptom::AbdominalPain => "Abdominal Pain",
            Symptom::Unconsciousness => "Unconsciousness",
        }
    }
}

/// 既往病史
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PreExistingCondition {
    None,
    Diabetes,
    Hypertension,
    #[serde(rename = "Heart Disease")]
    HeartDisease,
    Asthma,
}

impl PreExistingCondition {
    pub const ALL: [PreExistingCondition; 5] = [
        PreExistingCondition::None,
        PreExistingCondition::Diabetes,
        PreExistingCondition::Hypertension,
        PreExistingCondition::HeartDisease,
        PreExistingCondition::Asthma,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PreExistingCondition::None => "None",
            PreExistingCondition::Diabetes => "Diabetes",
            PreExistingCondition::Hypertension => "Hypertension",
            PreExistingCondition::HeartDisease => "Heart Disease",
            PreExistingCondition::Asthma => "Asthma",
        }
    }
}

/// 风险等级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// 就诊优先级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Standard,  // 常规
    Urgent,    // 紧急
    Immediate, // 立即
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Standard, Priority::Urgent, Priority::Immediate];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Standard => "Standard",
            Priority::Urgent => "Urgent",
            Priority::Immediate => "Immediate",
        }
    }
}

/// 分诊科室
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Department {
    Cardiology,
    Pulmonology,
    #[serde(rename = "General Medicine")]
    GeneralMedicine,
    Neurology,
    Emergency,
    Gynecology,
    Gastroenterology,
    Endocrinology,
}

impl Department {
    pub const ALL: [Department; 8] = [
        Department::Cardiology,
        Department::Pulmonology,
        Department::GeneralMedicine,
        Department::Neurology,
        Department::Emergency,
        Department::Gynecology,
        Department::Gastroenterology,
        Department::Endocrinology,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Department::Cardiology => "Cardiology",
            Department::Pulmonology => "Pulmonology",
            Department::GeneralMedicine => "General Medicine",
            Department::Neurology => "Neurology",
            Department::Emergency => "Emergency",
            Department::Gynecology => "Gynecology",
            Department::Gastroenterology => "Gastroenterology",
            Department::Endocrinology => "Endocrinology",
        }
    }
}

/// 按标签解析（忽略大小写和首尾空白）
fn parse_label<T: Copy>(kind: &str, input: &str, all: &[T], label: fn(&T) -> &'static str) -> Result<T> {
    let wanted = input.trim();
    all.iter()
        .copied()
        .find(|candidate| label(candidate).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| TriageError::Validation(format!("未知{}: {}", kind, input)))
}

impl FromStr for Gender {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        parse_label("性别", s, &Gender::ALL, Gender::label)
    }
}

impl FromStr for Symptom {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        parse_label("症状", s, &Symptom::ALL, Symptom::label)
    }
}

impl FromStr for PreExistingCondition {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        parse_label("既往病史", s, &PreExistingCondition::ALL, PreExistingCondition::label)
    }
}

impl FromStr for RiskLevel {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        parse_label("风险等级", s, &RiskLevel::ALL, RiskLevel::label)
    }
}

impl FromStr for Priority {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        parse_label("优先级", s, &Priority::ALL, Priority::label)
    }
}

impl FromStr for Department {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        parse_label("科室", s, &Department::ALL, Department::label)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for PreExistingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 患者观察数据
///
/// 每次评估请求创建一次，进入决策流水线前必须已通过 [`PatientObservation::validate`]。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientObservation {
    pub age: u32,
    pub gender: Gender,
    pub systolic_bp: u32,   // 收缩压 mmHg
    pub heart_rate: u32,    // 心率 bpm
    pub temperature_f: f64, // 体温 °F
    pub symptom: Symptom,
    pub pre_existing: PreExistingCondition,
}

impl PatientObservation {
    /// 创建并验证观察数据
    pub fn new(
        age: u32,
        gender: Gender,
        systolic_bp: u32,
        heart_rate: u32,
        temperature_f: f64,
        symptom: Symptom,
        pre_existing: PreExistingCondition,
    ) -> Result<Self> {
        let observation = Self {
            age,
            gender,
            systolic_bp,
            heart_rate,
            temperature_f,
            symptom,
            pre_existing,
        };
        observation.validate()?;
        Ok(observation)
    }

    /// 验证各字段是否在声明的取值域内
    pub fn validate(&self) -> Result<()> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(TriageError::Validation(format!(
                "年龄 {} 超出范围 {:?}",
                self.age, AGE_RANGE
            )));
        }
        if !SYSTOLIC_BP_RANGE.contains(&self.systolic_bp) {
            return Err(TriageError::Validation(format!(
                "收缩压 {} 超出范围 {:?}",
                self.systolic_bp, SYSTOLIC_BP_RANGE
            )));
        }
        if !HEART_RATE_RANGE.contains(&self.heart_rate) {
            return Err(TriageError::Validation(format!(
                "心率 {} 超出范围 {:?}",
                self.heart_rate, HEART_RATE_RANGE
            )));
        }
        if !self.temperature_f.is_finite() || !TEMPERATURE_RANGE_F.contains(&self.temperature_f) {
            return Err(TriageError::Validation(format!(
                "体温 {} 超出范围 {:?}",
                self.temperature_f, TEMPERATURE_RANGE_F
            )));
        }
        Ok(())
    }
}

/// 风险评估结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub risk: RiskLevel,
    pub confidence: f64,
    pub override_applied: bool,
}

/// 路由决策
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingDecision {
    pub department: Department,
    pub priority: Priority,
    pub base_wait_minutes: u32,
}

/// 特征重要性
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub weight: f64,
}

/// 单次性别反事实探测结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FairnessProbe {
    pub male_prediction: RiskLevel,
    pub female_prediction: RiskLevel,
    pub flagged: bool,
}

/// 群体层面的性别公平性指标
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationFairness {
    pub male_high_rate: f64,
    pub female_high_rate: f64,
    pub difference: f64,
    pub fair: bool,
}
