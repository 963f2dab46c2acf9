//! # 分诊风险模型模块
//!
//! 提供风险分类器的能力接口以及训练产物的加载：
//! - 编码表：分类特征与模型内部整数编码的双向映射
//! - 特征向量：按训练列顺序编码的观察数据
//! - 决策森林：从 JSON 工件反序列化的分类器
//! - 工件持有者：一次加载、只读共享、验证后原子替换
//! - 合成队列：用于批量审计的可复现数据

pub mod artifact;
pub mod classifier;
pub mod encoder;
pub mod features;
pub mod forest;
pub mod synthetic;

// 重新导出主要类型
pub use artifact::{ArtifactStore, ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use classifier::{classify, ClassifierOutcome, RiskClassifier};
pub use encoder::{CategoricalField, EncoderTable};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES, GENDER_SLOT};
pub use forest::{DecisionForest, DecisionTree, TreeNode};
pub use synthetic::{reference_risk, LabeledObservation, SyntheticCohort};
