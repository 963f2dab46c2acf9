//! # 分诊决策流水线
//!
//! 提供从观察数据到分诊结果的完整决策流程，包括：
//! - 安全规则引擎：确定性红旗检查，命中即高风险
//! - 决策合并：安全覆盖严格优先于分类器
//! - 科室路由：症状表、病史覆盖和优先级
//! - 负载调整：按医院负载放大等待时间
//! - 可解释性与公平性：特征重要性排序和性别反事实探测

pub mod combiner;
pub mod engine;
pub mod explainability;
pub mod fairness;
pub mod routing;
pub mod safety_rules;
pub mod wait;

#[cfg(test)]
mod test_support;

// 重新导出主要类型
pub use combiner::decide;
pub use engine::{TriageOutcome, TriagePipeline, DEFAULT_TOP_FEATURES};
pub use explainability::top_features;
pub use fairness::{audit_gender_sensitivity, population_fairness, FAIRNESS_THRESHOLD};
pub use routing::{priority_for, RoutingEngine};
pub use safety_rules::{check_override, triggered_rule, triggered_rules, SafetyRule, CRITICAL_SYMPTOMS};
pub use wait::{adjust_wait, FixedLoad, LoadSampler, UniformLoadSampler, DEFAULT_MAX_LOAD, DEFAULT_MIN_LOAD};
