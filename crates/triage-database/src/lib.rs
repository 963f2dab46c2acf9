//! # 分诊数据库模块
//!
//! 负责患者与就诊记录的持久化，提供SQLite连接池、幂等写入和查询删除操作。

pub mod connection;
pub mod models;
pub mod queries;
pub mod sink;

// 重新导出主要类型
pub use connection::DatabasePool;
pub use models::*;
pub use queries::DatabaseQueries;
pub use sink::{MemoryVisitSink, VisitSink};
