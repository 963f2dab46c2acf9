//! 配置管理
//!
//! 配置来源依次叠加：内置默认值、TOML 配置文件、`TRIAGE_` 前缀的环境变量。
//! 例如 `TRIAGE_DATABASE__URL` 覆盖 `database.url`。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: Arc<RwLock<TriageConfig>>,
    /// 配置文件路径
    config_path: Option<PathBuf>,
    /// 配置验证器
    validator: ConfigValidator,
}

/// 分诊系统完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TriageConfig {
    /// 流水线配置
    pub pipeline: PipelineConfig,
    /// 模型配置
    pub model: ModelConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 流水线配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// 展示的特征重要性数量
    pub top_features: usize,
    /// 医院负载抽样下限（百分比）
    pub min_load: u32,
    /// 医院负载抽样上限（百分比）
    pub max_load: u32,
    /// 固定负载，设置后不再抽样
    pub fixed_load: Option<u32>,
    /// 报告每页行数
    pub report_lines_per_page: usize,
    /// 界面语言
    pub language: String,
}

/// 模型配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// 模型工件路径
    pub artifact_path: String,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 连接字符串
    pub url: String,
    /// 最大连接数
    pub max_connections: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或 EnvFilter 指令
    pub level: String,
    /// 输出格式：compact 或 pretty
    pub format: String,
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    field_path: &'static str,
    validator: fn(&TriageConfig) -> Result<()>,
}

impl ConfigManager {
    /// 从配置文件创建配置管理器，文件不存在时使用默认值
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Self::load_config(config_path)?;
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: config_path.map(Path::to_path_buf),
            validator,
        })
    }

    /// 直接使用给定配置
    pub fn from_config(config: TriageConfig) -> Result<Self> {
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: None,
            validator,
        })
    }

    /// 加载配置
    fn load_config(config_path: Option<&Path>) -> Result<TriageConfig> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("TRIAGE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: TriageConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        match config_path {
            Some(path) => info!("Configuration loaded from: {}", path.display()),
            None => info!("Configuration loaded from defaults and environment"),
        }
        Ok(config)
    }

    /// 获取当前配置
    pub async fn get_config(&self) -> TriageConfig {
        let config = self.config.read().await;
        config.clone()
    }

    /// 验证后替换配置
    pub async fn update_config(&self, new_config: TriageConfig) -> Result<()> {
        self.validator.validate(&new_config)?;

        {
            let mut config = self.config.write().await;
            *config = new_config;
        }

        info!("Configuration updated successfully");
        Ok(())
    }

    /// 保存配置到文件
    pub async fn save_config(&self, path: &Path) -> Result<()> {
        let config = self.config.read().await;
        let config_str =
            toml::to_string_pretty(&*config).context("Failed to serialize configuration")?;

        tokio::fs::write(path, config_str)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// 重新加载配置文件
    ///
    /// 新配置验证失败时保留旧配置。
    pub async fn reload_config(&self) -> Result<()> {
        let new_config = Self::load_config(self.config_path.as_deref())?;
        self.update_config(new_config).await
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "pipeline.max_load",
                validator: |config| {
                    let pipeline = &config.pipeline;
                    if pipeline.max_load > 100 {
                        Err(anyhow::anyhow!("Load upper bound {} exceeds 100", pipeline.max_load))
                    } else if pipeline.min_load > pipeline.max_load {
                        Err(anyhow::anyhow!(
                            "Load lower bound {} is greater than upper bound {}",
                            pipeline.min_load,
                            pipeline.max_load
                        ))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "pipeline.fixed_load",
                validator: |config| match config.pipeline.fixed_load {
                    Some(load) if load > 100 => Err(anyhow::anyhow!("Fixed load {} exceeds 100", load)),
                    _ => Ok(()),
                },
            },
            ValidationRule {
                field_path: "pipeline.top_features",
                validator: |config| {
                    if config.pipeline.top_features == 0 {
                        Err(anyhow::anyhow!("Top feature count cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "model.artifact_path",
                validator: |config| {
                    if config.model.artifact_path.trim().is_empty() {
                        Err(anyhow::anyhow!("Model artifact path cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "database.url",
                validator: |config| {
                    if config.database.url.trim().is_empty() {
                        Err(anyhow::anyhow!("Database URL cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "database.max_connections",
                validator: |config| {
                    if config.database.max_connections == 0 {
                        Err(anyhow::anyhow!("Database max connections cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
        ];

        Self { validation_rules }
    }

    pub fn validate(&self, config: &TriageConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(e.context(format!("Invalid configuration value: {}", rule.field_path)));
            }
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_features: triage_workflow::DEFAULT_TOP_FEATURES,
            min_load: triage_workflow::DEFAULT_MIN_LOAD,
            max_load: triage_workflow::DEFAULT_MAX_LOAD,
            fixed_load: None,
            report_lines_per_page: 40,
            language: "English".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "models/risk_model.json".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://triage_history.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}
