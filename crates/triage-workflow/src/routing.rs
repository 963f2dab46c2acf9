//! 科室路由引擎
//!
//! 根据风险等级、主诉症状和既往病史确定就诊科室、优先级和基础等待时间

use std::collections::HashMap;
use triage_core::{Department, PreExistingCondition, Priority, RiskLevel, RoutingDecision, Symptom};

/// 科室路由引擎
#[derive(Debug, Clone)]
pub struct RoutingEngine {
    symptom_departments: HashMap<Symptom, Department>,
    default_department: Department,
}

impl RoutingEngine {
    /// 创建带默认症状-科室映射表的路由引擎
    pub fn new() -> Self {
        let mut symptom_departments = HashMap::new();
        symptom_departments.insert(Symptom::ChestPain, Department::Cardiology);
        symptom_departments.insert(Symptom::ShortnessOfBreath, Department::Pulmonology);
        symptom_departments.insert(Symptom::Fever, Department::GeneralMedicine);
        symptom_departments.insert(Symptom::Seizure, Department::Neurology);
        symptom_departments.insert(Symptom::HeadInjury, Department::Emergency);
        symptom_departments.insert(Symptom::PregnancyComplication, Department::Gynecology);
        symptom_departments.insert(Symptom::AbdominalPain, Department::Gastroenterology);
        symptom_departments.insert(Symptom::Unconsciousness, Department::Emergency);

        Self {
            symptom_departments,
            default_department: Department::GeneralMedicine,
        }
    }

    /// 扩展或覆盖症状对应的科室
    pub fn with_symptom_department(mut self, symptom: Symptom, department: Department) -> Self {
        self.symptom_departments.insert(symptom, department);
        self
    }

    /// 查询症状对应的基础科室
    pub fn department_for(&self, symptom: Symptom) -> Department {
        self.symptom_departments
            .get(&symptom)
            .copied()
            .unwrap_or(self.default_department)
    }

    /// 路由决策
    ///
    /// 顺序固定：症状查表 → 病史覆盖 → 按风险定优先级 → 急诊科强制立即就诊。
    pub fn route(&self, risk: RiskLevel, symptom: Symptom, pre_existing: PreExistingCondition) -> RoutingDecision {
        let mut department = self.department_for(symptom);

        // 既往病史覆盖
        if pre_existing == PreExistingCondition::HeartDisease {
            department = Department::Cardiology;
        } else if pre_existing == PreExistingCondition::Diabetes {
            department = Department::Endocrinology;
        }

        let (mut priority, mut base_wait_minutes) = priority_for(risk);

        // 急诊科覆盖
        if department == Department::Emergency {
            priority = Priority::Immediate;
            base_wait_minutes = 0;
        }

        tracing::info!(
            "Routed {} risk patient with {} / {} to {} ({}, base wait {} min)",
            risk,
            symptom,
            pre_existing,
            department,
            priority,
            base_wait_minutes
        );

        RoutingDecision {
            department,
            priority,
            base_wait_minutes,
        }
    }
}

/// 风险等级对应的优先级与基础等待时间（分钟）
pub fn priority_for(risk: RiskLevel) -> (Priority, u32) {
    match risk {
        RiskLevel::High => (Priority::Immediate, 0),
        RiskLevel::Medium => (Priority::Urgent, 15),
        RiskLevel::Low => (Priority::Standard, 30),
    }
}

impl Default for RoutingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_symptom_table() {
        let engine = RoutingEngine::new();
        assert_eq!(engine.department_for(Symptom::ChestPain), Department::Cardiology);
        assert_eq!(engine.department_for(Symptom::ShortnessOfBreath), Department::Pulmonology);
        assert_eq!(engine.department_for(Symptom::Seizure), Department::Neurology);
        assert_eq!(engine.department_for(Symptom::PregnancyComplication), Department::Gynecology);
        assert_eq!(engine.department_for(Symptom::AbdominalPain), Department::Gastroenterology);
        // 不在表中的症状回落到普通内科
        assert_eq!(engine.department_for(Symptom::Cough), Department::GeneralMedicine);
        assert_eq!(engine.department_for(Symptom::SevereHeadache), Department::GeneralMedicine);
    }

    #[test]
    fn test_priority_by_risk() {
        let engine = RoutingEngine::new();
        let low = engine.route(RiskLevel::Low, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(
            low,
            RoutingDecision {
                department: Department::GeneralMedicine,
                priority: Priority::Standard,
                base_wait_minutes: 30,
            }
        );

        let medium = engine.route(RiskLevel::Medium, Symptom::Seizure, PreExistingCondition::Asthma);
        assert_eq!(medium.department, Department::Neurology);
        assert_eq!(medium.priority, Priority::Urgent);
        assert_eq!(medium.base_wait_minutes, 15);
    }

    #[test]
    fn test_condition_overrides_symptom() {
        let engine = RoutingEngine::new();
        let cardiac = engine.route(RiskLevel::Low, Symptom::Fever, PreExistingCondition::HeartDisease);
        assert_eq!(cardiac.department, Department::Cardiology);

        let diabetic = engine.route(RiskLevel::Low, Symptom::ChestPain, PreExistingCondition::Diabetes);
        assert_eq!(diabetic.department, Department::Endocrinology);

        let hypertensive = engine.route(RiskLevel::Low, Symptom::ShortnessOfBreath, PreExistingCondition::Hypertension);
        assert_eq!(hypertensive.department, Department::Pulmonology);
    }

    #[test]
    fn test_emergency_forces_immediate() {
        let engine = RoutingEngine::new();
        let head_injury = engine.route(RiskLevel::Low, Symptom::HeadInjury, PreExistingCondition::None);
        assert_eq!(head_injury.department, Department::Emergency);
        assert_eq!(head_injury.priority, Priority::Immediate);
        assert_eq!(head_injury.base_wait_minutes, 0);

        // 病史覆盖后不再是急诊科，按风险定优先级
        let cardiac_unconscious = engine.route(RiskLevel::Medium, Symptom::Unconsciousness, PreExistingCondition::HeartDisease);
        assert_eq!(cardiac_unconscious.department, Department::Cardiology);
        assert_eq!(cardiac_unconscious.priority, Priority::Urgent);
    }

    #[test]
    fn test_extended_table() {
        let engine = RoutingEngine::new().with_symptom_department(Symptom::Cough, Department::Emergency);
        let decision = engine.route(RiskLevel::Low, Symptom::Cough, PreExistingCondition::None);
        assert_eq!(decision.priority, Priority::Immediate);
        assert_eq!(decision.base_wait_minutes, 0);
    }

    proptest! {
        #[test]
        fn prop_high_risk_is_immediate(
            symptom in prop::sample::select(Symptom::ALL.to_vec()),
            condition in prop::sample::select(PreExistingCondition::ALL.to_vec()),
        ) {
            let decision = RoutingEngine::new().route(RiskLevel::High, symptom, condition);
            prop_assert_eq!(decision.priority, Priority::Immediate);
            prop_assert_eq!(decision.base_wait_minutes, 0);
        }
    }
}
