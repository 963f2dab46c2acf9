//! 错误定义模块

use thiserror::Error;

/// 分诊系统统一错误类型
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("输入验证错误: {0}")]
    Validation(String),

    #[error("未知分类取值: 字段 {field} 中不存在 \"{value}\"")]
    UnknownCategory { field: String, value: String },

    #[error("模型不支持该操作: {0}")]
    UnsupportedModel(String),

    #[error("模型工件加载失败: {0}")]
    ArtifactLoad(String),

    #[error("分类器错误: {0}")]
    Classification(String),

    #[error("报告生成错误: {0}")]
    Report(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for TriageError {
    fn from(err: sqlx::Error) -> Self {
        TriageError::Database(err.to_string())
    }
}

/// 分诊系统统一结果类型
pub type Result<T> = std::result::Result<T, TriageError>;
