//! 安全规则引擎
//!
//! 对原始生命体征、症状和病史做确定性检查。任一规则命中即判定为高风险，
//! 统计模型的不确定性不能把这些红旗情况降级。未命中返回 None，
//! 含义是“交给分类器判断”，而不是“患者安全”。

use serde::{Deserialize, Serialize};
use triage_core::{PatientObservation, PreExistingCondition, RiskLevel, Symptom};

/// 危急症状
pub const CRITICAL_SYMPTOMS: [Symptom; 4] = [
    Symptom::ChestPain,
    Symptom::Seizure,
    Symptom::ShortnessOfBreath,
    Symptom::Unconsciousness,
];

/// 安全覆盖规则
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SafetyRule {
    ExtremeBloodPressure,     // 收缩压 >= 180 或 <= 80
    ExtremeHeartRate,         // 心率 >= 130 或 <= 40
    ExtremeTemperature,       // 体温 >= 103°F 或 <= 95°F
    CriticalSymptomWithRisk,  // 危急症状 + 高龄或心血管病史
    FebrileYoungChild,        // 5 岁及以下且体温 >= 101°F
    ElderlyUnstableVitals,    // 70 岁及以上且收缩压 > 160 或心率 > 110
}

impl SafetyRule {
    /// 评估顺序；语义上只要求“任一命中即高风险”，顺序只影响报告哪条规则
    pub const ALL: [SafetyRule; 6] = [
        SafetyRule::ExtremeBloodPressure,
        SafetyRule::ExtremeHeartRate,
        SafetyRule::ExtremeTemperature,
        SafetyRule::CriticalSymptomWithRisk,
        SafetyRule::FebrileYoungChild,
        SafetyRule::ElderlyUnstableVitals,
    ];

    /// 判断规则是否命中
    pub fn matches(&self, observation: &PatientObservation) -> bool {
        let bp = observation.systolic_bp;
        let hr = observation.heart_rate;
        let temp = observation.temperature_f;
        let age = observation.age;

        match self {
            SafetyRule::ExtremeBloodPressure => bp >= 180 || bp <= 80,
            SafetyRule::ExtremeHeartRate => hr >= 130 || hr <= 40,
            SafetyRule::ExtremeTemperature => temp >= 103.0 || temp <= 95.0,
            SafetyRule::CriticalSymptomWithRisk => {
                CRITICAL_SYMPTOMS.contains(&observation.symptom)
                    && (age >= 60
                        || matches!(
                            observation.pre_existing,
                            PreExistingCondition::HeartDisease | PreExistingCondition::Hypertension
                        ))
            }
            SafetyRule::FebrileYoungChild => age <= 5 && temp >= 101.0,
            SafetyRule::ElderlyUnstableVitals => age >= 70 && (bp > 160 || hr > 110),
        }
    }

    /// 规则说明
    pub fn description(&self) -> &'static str {
        match self {
            SafetyRule::ExtremeBloodPressure => "Systolic blood pressure >= 180 or <= 80 mmHg",
            SafetyRule::ExtremeHeartRate => "Heart rate >= 130 or <= 40 bpm",
            SafetyRule::ExtremeTemperature => "Temperature >= 103 or <= 95 F",
            SafetyRule::CriticalSymptomWithRisk => {
                "Critical symptom with age >= 60 or cardiovascular history"
            }
            SafetyRule::FebrileYoungChild => "Age <= 5 with temperature >= 101 F",
            SafetyRule::ElderlyUnstableVitals => "Age >= 70 with systolic BP > 160 or heart rate > 110",
        }
    }
}

/// 返回第一条命中的规则
pub fn triggered_rule(observation: &PatientObservation) -> Option<SafetyRule> {
    SafetyRule::ALL.iter().copied().find(|rule| rule.matches(observation))
}

/// 返回所有命中的规则
pub fn triggered_rules(observation: &PatientObservation) -> Vec<SafetyRule> {
    SafetyRule::ALL
        .iter()
        .copied()
        .filter(|rule| rule.matches(observation))
        .collect()
}

/// 安全覆盖检查
pub fn check_override(observation: &PatientObservation) -> Option<RiskLevel> {
    let rule = triggered_rule(observation)?;
    tracing::debug!("Safety rule {:?} matched", rule);
    Some(RiskLevel::High)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{arbitrary_observation, observation};
    use proptest::prelude::*;
    use triage_core::Gender;

    #[test]
    fn test_calm_adult_has_no_override() {
        let calm = observation(30, 120, 80, 98.6, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(check_override(&calm), None);
        assert!(triggered_rules(&calm).is_empty());
    }

    #[test]
    fn test_vital_thresholds_are_inclusive() {
        let cases = [
            (observation(30, 180, 80, 98.6, Symptom::Cough, PreExistingCondition::None), SafetyRule::ExtremeBloodPressure),
            (observation(30, 80, 80, 98.6, Symptom::Cough, PreExistingCondition::None), SafetyRule::ExtremeBloodPressure),
            (observation(30, 120, 130, 98.6, Symptom::Cough, PreExistingCondition::None), SafetyRule::ExtremeHeartRate),
            (observation(30, 120, 40, 98.6, Symptom::Cough, PreExistingCondition::None), SafetyRule::ExtremeHeartRate),
            (observation(30, 120, 80, 103.0, Symptom::Cough, PreExistingCondition::None), SafetyRule::ExtremeTemperature),
            (observation(30, 120, 80, 95.0, Symptom::Cough, PreExistingCondition::None), SafetyRule::ExtremeTemperature),
        ];
        for (obs, rule) in cases {
            assert_eq!(triggered_rule(&obs), Some(rule));
            assert_eq!(check_override(&obs), Some(RiskLevel::High));
        }

        let just_inside = observation(30, 179, 129, 102.9, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(check_override(&just_inside), None);
        let just_above_low = observation(30, 81, 41, 95.1, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(check_override(&just_above_low), None);
    }

    #[test]
    fn test_critical_symptom_requires_age_or_history() {
        let young_chest_pain = observation(40, 120, 80, 98.6, Symptom::ChestPain, PreExistingCondition::None);
        assert_eq!(check_override(&young_chest_pain), None);

        let elderly_seizure = observation(60, 120, 80, 98.6, Symptom::Seizure, PreExistingCondition::None);
        assert_eq!(triggered_rule(&elderly_seizure), Some(SafetyRule::CriticalSymptomWithRisk));

        let hypertensive = observation(35, 120, 80, 98.6, Symptom::ShortnessOfBreath, PreExistingCondition::Hypertension);
        assert_eq!(check_override(&hypertensive), Some(RiskLevel::High));

        let unconscious = observation(35, 120, 80, 98.6, Symptom::Unconsciousness, PreExistingCondition::HeartDisease);
        assert_eq!(check_override(&unconscious), Some(RiskLevel::High));

        let diabetic = observation(35, 120, 80, 98.6, Symptom::ChestPain, PreExistingCondition::Diabetes);
        assert_eq!(check_override(&diabetic), None);

        let elderly_fever = observation(65, 120, 80, 98.6, Symptom::Fever, PreExistingCondition::None);
        assert_eq!(check_override(&elderly_fever), None);
    }

    #[test]
    fn test_age_group_rules() {
        let febrile_toddler = observation(5, 100, 110, 101.0, Symptom::Fever, PreExistingCondition::None);
        assert_eq!(triggered_rule(&febrile_toddler), Some(SafetyRule::FebrileYoungChild));

        let febrile_child = observation(6, 100, 110, 101.0, Symptom::Fever, PreExistingCondition::None);
        assert_eq!(check_override(&febrile_child), None);

        let elderly_hypertensive = observation(70, 161, 80, 98.6, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(triggered_rule(&elderly_hypertensive), Some(SafetyRule::ElderlyUnstableVitals));

        let elderly_tachycardic = observation(75, 130, 111, 98.6, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(check_override(&elderly_tachycardic), Some(RiskLevel::High));

        let elderly_at_limits = observation(70, 160, 110, 98.6, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(check_override(&elderly_at_limits), None);
    }

    #[test]
    fn test_multiple_rules_reported_in_order() {
        let unstable = observation(72, 185, 135, 98.6, Symptom::ChestPain, PreExistingCondition::None);
        assert_eq!(
            triggered_rules(&unstable),
            vec![
                SafetyRule::ExtremeBloodPressure,
                SafetyRule::ExtremeHeartRate,
                SafetyRule::CriticalSymptomWithRisk,
                SafetyRule::ElderlyUnstableVitals,
            ]
        );
        assert_eq!(triggered_rule(&unstable), Some(SafetyRule::ExtremeBloodPressure));
    }

    proptest! {
        #[test]
        fn prop_high_systolic_always_overrides(obs in arbitrary_observation(), bp in 180u32..=300) {
            let obs = PatientObservation { systolic_bp: bp, ..obs };
            prop_assert_eq!(check_override(&obs), Some(RiskLevel::High));
        }

        #[test]
        fn prop_low_systolic_always_overrides(obs in arbitrary_observation(), bp in 40u32..=80) {
            let obs = PatientObservation { systolic_bp: bp, ..obs };
            prop_assert_eq!(check_override(&obs), Some(RiskLevel::High));
        }

        #[test]
        fn prop_override_agrees_with_rule_set(obs in arbitrary_observation()) {
            let any_rule = SafetyRule::ALL.iter().any(|rule| rule.matches(&obs));
            prop_assert_eq!(check_override(&obs).is_some(), any_rule);
            // 性别不参与任何规则
            let flipped = PatientObservation {
                gender: if obs.gender == Gender::Male { Gender::Female } else { Gender::Male },
                ..obs.clone()
            };
            prop_assert_eq!(check_override(&flipped), check_override(&obs));
        }
    }
}
