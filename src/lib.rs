//! # 急诊分诊决策支持系统
//!
//! 汇总各子模块，便于演示程序和外部使用者只依赖一个包。

pub use triage_core as core;
pub use triage_integration as integration;
pub use triage_model as model;
pub use triage_workflow as workflow;
