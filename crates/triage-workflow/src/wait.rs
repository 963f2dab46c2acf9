//! 负载调整后的等待时间

use rand::Rng;
use triage_core::{Result, TriageError};

/// 默认医院负载下限（百分比）
pub const DEFAULT_MIN_LOAD: u32 = 20;
/// 默认医院负载上限（百分比）
pub const DEFAULT_MAX_LOAD: u32 = 100;

/// 按医院负载放大基础等待时间：`floor(base * (1 + load / 100))`
pub fn adjust_wait(base_minutes: u32, load_percent: u32) -> u32 {
    let scaled = u64::from(base_minutes) * (100 + u64::from(load_percent)) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// 医院负载来源
pub trait LoadSampler: Send + Sync {
    /// 当前负载百分比
    fn sample(&self) -> u32;
}

/// 在区间内均匀抽样的负载
#[derive(Debug, Clone, Copy)]
pub struct UniformLoadSampler {
    min: u32,
    max: u32,
}

impl UniformLoadSampler {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(TriageError::Validation(format!(
                "负载下限 {} 大于上限 {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn bounds(&self) -> (u32, u32) {
        (self.min, self.max)
    }
}

impl Default for UniformLoadSampler {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_LOAD,
            max: DEFAULT_MAX_LOAD,
        }
    }
}

impl LoadSampler for UniformLoadSampler {
    fn sample(&self) -> u32 {
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

/// 固定负载，用于测试和回放
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLoad(pub u32);

impl LoadSampler for FixedLoad {
    fn sample(&self) -> u32 {
        self.0
    }
}
