//! 合成分诊队列
//!
//! 复现训练数据的生成规则：随机生成生命体征与症状，再按累计风险分给出标签。
//! 用于批量公平性审计和演示，不参与线上单次评估。

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use triage_core::{Gender, PatientObservation, PreExistingCondition, RiskLevel, Symptom};

/// 带参考标签的合成观察
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledObservation {
    pub patient_id: String,
    pub observation: PatientObservation,
    pub risk: RiskLevel,
}

/// 按生成规则计算的累计风险分
pub fn reference_score(observation: &PatientObservation) -> u32 {
    let mut score = 0;

    score += match observation.age {
        a if a > 60 => 2,
        a if a > 40 => 1,
        _ => 0,
    };
    score += match observation.systolic_bp {
        bp if bp > 160 => 2,
        bp if bp > 140 => 1,
        _ => 0,
    };
    score += match observation.heart_rate {
        hr if hr > 120 => 2,
        hr if hr > 100 => 1,
        _ => 0,
    };
    score += if observation.temperature_f > 101.0 {
        2
    } else if observation.temperature_f > 99.0 {
        1
    } else {
        0
    };
    score += match observation.symptom {
        Symptom::ChestPain | Symptom::Seizure => 3,
        Symptom::ShortnessOfBreath | Symptom::SevereHeadache => 2,
        _ => 1,
    };
    score += match observation.pre_existing {
        PreExistingCondition::HeartDisease => 2,
        PreExistingCondition::Diabetes | PreExistingCondition::Hypertension | PreExistingCondition::Asthma => 1,
        PreExistingCondition::None => 0,
    };

    score
}

/// 风险分映射为风险等级：>= 8 高，>= 4 中，其余低
pub fn reference_risk(observation: &PatientObservation) -> RiskLevel {
    match reference_score(observation) {
        s if s >= 8 => RiskLevel::High,
        s if s >= 4 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// 合成队列生成器
#[derive(Debug)]
pub struct SyntheticCohort {
    rng: StdRng,
    next_id: usize,
}

impl SyntheticCohort {
    /// 以固定种子创建，相同种子产生相同队列
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// 生成一条带标签的观察
    pub fn next_record(&mut self) -> LabeledObservation {
        let age = self.rng.gen_range(18..90);
        let gender = *Gender::ALL.choose(&mut self.rng).unwrap_or(&Gender::Female);
        let systolic_bp = self.rng.gen_range(100..190);
        let heart_rate = self.rng.gen_range(55..140);
        let temperature_f = (self.rng.gen_range(97.0..103.0_f64) * 10.0).round() / 10.0;
        let symptom = *Symptom::INTAKE.choose(&mut self.rng).unwrap_or(&Symptom::Cough);
        let pre_existing = *PreExistingCondition::ALL
            .choose(&mut self.rng)
            .unwrap_or(&PreExistingCondition::None);

        let observation = PatientObservation {
            age,
            gender,
            systolic_bp,
            heart_rate,
            temperature_f,
            symptom,
            pre_existing,
        };
        let risk = reference_risk(&observation);
        let patient_id = format!("P{}", self.next_id);
        self.next_id += 1;

        LabeledObservation {
            patient_id,
            observation,
            risk,
        }
    }

    /// 生成指定数量的记录
    pub fn generate(&mut self, size: usize) -> Vec<LabeledObservation> {
        (0..size).map(|_| self.next_record()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(age: u32, bp: u32, hr: u32, temp: f64, symptom: Symptom, condition: PreExistingCondition) -> PatientObservation {
        PatientObservation::new(age, Gender::Male, bp, hr, temp, symptom, condition).unwrap()
    }

    #[test]
    fn test_reference_labels() {
        let calm = observation(30, 120, 80, 98.6, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(reference_score(&calm), 1);
        assert_eq!(reference_risk(&calm), RiskLevel::Low);

        let moderate = observation(45, 150, 90, 99.5, Symptom::Fever, PreExistingCondition::None);
        assert_eq!(reference_score(&moderate), 4);
        assert_eq!(reference_risk(&moderate), RiskLevel::Medium);

        let severe = observation(70, 170, 125, 101.5, Symptom::ChestPain, PreExistingCondition::HeartDisease);
        assert_eq!(reference_score(&severe), 13);
        assert_eq!(reference_risk(&severe), RiskLevel::High);
    }

    #[test]
    fn test_cohort_is_reproducible_and_in_domain() {
        let first = SyntheticCohort::new(42).generate(200);
        let second = SyntheticCohort::new(42).generate(200);

        assert_eq!(first.len(), 200);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.observation, b.observation);
            assert_eq!(a.risk, b.risk);
            assert!(a.observation.validate().is_ok());
            assert!(Symptom::INTAKE.contains(&a.observation.symptom));
        }
        assert_eq!(first[0].patient_id, "P1");
        assert_eq!(first[199].patient_id, "P200");
    }
}
