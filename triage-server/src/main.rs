//! 分诊服务主程序

mod commands;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use triage_admin::{init_logging, ConfigManager};
use triage_core::{Gender, PreExistingCondition, Symptom};

/// 分诊服务命令行参数
#[derive(Parser, Debug)]
#[command(name = "triage-server")]
#[command(about = "急诊分诊决策支持系统")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/triage.toml")]
    config: PathBuf,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 评估一位患者并记录就诊
    Assess(AssessArgs),
    /// 查看患者的就诊历史
    History {
        patient_id: String,
    },
    /// 查看最近的就诊
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// 列出所有患者
    Patients,
    /// 删除患者及其全部就诊
    DeletePatient {
        patient_id: String,
    },
    /// 删除单次就诊
    DeleteVisit {
        patient_id: String,
        /// 就诊时间，格式 YYYY-MM-DD HH:MM:SS
        timestamp: String,
    },
    /// 在合成队列上做人群公平性审计
    Audit {
        #[arg(long, default_value_t = 500)]
        size: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// 输出模型的主要特征
    Explain {
        #[arg(long)]
        top: Option<usize>,
    },
    /// 在合成队列上运行流水线并输出指标
    Metrics {
        #[arg(long, default_value_t = 200)]
        size: usize,
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

/// 评估参数
#[derive(ClapArgs, Debug)]
struct AssessArgs {
    /// 患者ID，留空时按当前时间生成
    #[arg(long, default_value = "")]
    patient_id: String,
    #[arg(long)]
    age: u32,
    #[arg(long)]
    gender: Gender,
    /// 收缩压 mmHg
    #[arg(long)]
    bp: u32,
    /// 心率 bpm
    #[arg(long)]
    hr: u32,
    /// 体温 °F
    #[arg(long)]
    temp: f64,
    #[arg(long)]
    symptom: Symptom,
    #[arg(long, default_value = "None")]
    condition: PreExistingCondition,
    /// 既往病历文本文件，仅用于提示和备注
    #[arg(long)]
    notes: Option<PathBuf>,
    /// 固定医院负载（百分比）
    #[arg(long)]
    load: Option<u32>,
    /// 报告语言
    #[arg(long)]
    language: Option<String>,
    /// 以JSON输出
    #[arg(long)]
    json: bool,
    /// 不写入数据库
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let manager = ConfigManager::new(Some(&args.config))
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    let mut config = manager.get_config().await;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    // 初始化日志
    init_logging(&config.logging)?;
    info!("Triage server starting with command {:?}", args.command);

    let result = match args.command {
        Command::Assess(assess) => commands::assess(&config, assess).await,
        Command::History { patient_id } => commands::history(&config, &patient_id).await,
        Command::Recent { limit } => commands::recent(&config, limit).await,
        Command::Patients => commands::patients(&config).await,
        Command::DeletePatient { patient_id } => commands::delete_patient(&config, &patient_id).await,
        Command::DeleteVisit { patient_id, timestamp } => {
            commands::delete_visit(&config, &patient_id, &timestamp).await
        }
        Command::Audit { size, seed } => commands::audit(&config, size, seed),
        Command::Explain { top } => commands::explain(&config, top),
        Command::Metrics { size, seed } => commands::metrics(&config, size, seed),
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}
