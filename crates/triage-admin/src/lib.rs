//! # 分诊管理模块
//!
//! 提供配置管理、日志初始化和指标导出等运维功能

pub mod config;
pub mod logging;
pub mod monitoring;

pub use config::{
    ConfigManager, ConfigValidator, DatabaseConfig, LoggingConfig, ModelConfig, PipelineConfig,
    TriageConfig,
};
pub use logging::{init_logging, LogFormat};
pub use monitoring::TriageMetrics;
