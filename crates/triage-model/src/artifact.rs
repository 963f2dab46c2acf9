//! 模型工件加载
//!
//! 一个版本化的 JSON 工件同时携带分类器和编码表。加载时完整验证，
//! 缺失、损坏、版本不兼容或相互不一致都返回 `ArtifactLoad` 错误。

use crate::classifier::RiskClassifier;
use crate::encoder::EncoderTable;
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::forest::DecisionForest;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};
use triage_core::{Result, TriageError};

/// 支持的工件格式版本
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// 模型工件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_id: String,
    #[serde(default)]
    pub trained_at: Option<String>,
    pub feature_names: Vec<String>,
    pub encoders: EncoderTable,
    pub classifier: DecisionForest,
}

impl ModelArtifact {
    /// 从 JSON 文本解析并验证
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(json)
            .map_err(|e| TriageError::ArtifactLoad(format!("工件解析失败: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TriageError::ArtifactLoad(format!("无法读取 {}: {}", path.display(), e)))?;
        let artifact = Self::from_json(&json)?;

        tracing::info!(
            "Loaded model artifact {} (format v{}, {} trees) from {}",
            artifact.model_id,
            artifact.format_version,
            artifact.classifier.trees.len(),
            path.display()
        );
        Ok(artifact)
    }

    /// 验证工件内部一致性
    pub fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(TriageError::ArtifactLoad(format!(
                "不支持的工件版本 {}，期望 {}",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if self.model_id.trim().is_empty() {
            return Err(TriageError::ArtifactLoad("工件缺少 model_id".to_string()));
        }
        if self.feature_names.len() != FEATURE_COUNT
            || self.feature_names.iter().zip(FEATURE_NAMES).any(|(actual, expected)| actual != expected)
        {
            return Err(TriageError::ArtifactLoad(format!(
                "特征列 {:?} 与期望的 {:?} 不一致",
                self.feature_names, FEATURE_NAMES
            )));
        }

        self.encoders.validate()?;
        self.classifier.validate()?;

        if self.classifier.n_features != FEATURE_COUNT {
            return Err(TriageError::ArtifactLoad(format!(
                "分类器特征数 {} 与期望的 {} 不一致",
                self.classifier.n_features, FEATURE_COUNT
            )));
        }
        if self.classifier.n_classes != self.encoders.risk_class_count() {
            return Err(TriageError::ArtifactLoad(format!(
                "分类器类别数 {} 与风险编码类别数 {} 不一致",
                self.classifier.n_classes,
                self.encoders.risk_class_count()
            )));
        }

        Ok(())
    }

    pub fn encoder(&self) -> &EncoderTable {
        &self.encoders
    }
}

impl RiskClassifier for ModelArtifact {
    fn n_features(&self) -> usize {
        self.classifier.n_features()
    }

    fn n_classes(&self) -> usize {
        self.classifier.n_classes()
    }

    fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        self.classifier.predict_probabilities(features)
    }

    fn predict(&self, features: &FeatureVector) -> Result<usize> {
        self.classifier.predict(features)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.classifier.feature_importances()
    }
}

/// 工件持有者
///
/// 读取方拿到的是 `Arc` 快照；热更新先完整加载并验证新工件，
/// 再整体替换指针，不会原地修改正在使用的工件。
#[derive(Debug)]
pub struct ArtifactStore {
    current: RwLock<Arc<ModelArtifact>>,
}

impl ArtifactStore {
    pub fn new(artifact: ModelArtifact) -> Result<Self> {
        artifact.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(artifact)),
        })
    }

    /// 从文件打开
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(ModelArtifact::load(path)?)
    }

    /// 当前工件快照
    pub fn current(&self) -> Arc<ModelArtifact> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// 验证后替换当前工件
    pub fn replace(&self, artifact: ModelArtifact) -> Result<()> {
        artifact.validate()?;
        let next = Arc::new(artifact);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tracing::info!("Swapping model artifact {} -> {}", guard.model_id, next.model_id);
        *guard = next;
        Ok(())
    }

    /// 从文件重新加载；加载失败时保留旧工件
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<()> {
        let artifact = ModelArtifact::load(path)?;
        self.replace(artifact)
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_ARTIFACT: &str = r#"{
  "format_version": 1,
  "model_id": "unit-test-forest",
  "feature_names": ["age", "gender", "bp", "hr", "temp", "symptom", "pre_existing"],
  "encoders": {
    "gender": ["Female", "Male"],
    "symptom": ["Chest Pain", "Cough", "Fever", "Seizure", "Severe Headache", "Shortness of Breath"],
    "pre_existing": ["Asthma", "Diabetes", "Heart Disease", "Hypertension", "None"],
    "risk": ["High", "Low", "Medium"]
  },
  "classifier": {
    "n_features": 7,
    "n_classes": 3,
    "feature_importances": [0.3, 0.0, 0.5, 0.2, 0.0, 0.0, 0.0],
    "trees": [
      {"nodes": [
        {"kind": "split", "feature": 2, "threshold": 150.5, "left": 1, "right": 2},
        {"kind": "leaf", "value": [1.0, 7.0, 2.0]},
        {"kind": "leaf", "value": [6.0, 0.0, 4.0]}
      ]}
    ]
  }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sample_artifact() {
        let artifact = ModelArtifact::from_json(SAMPLE_ARTIFACT).unwrap();
        assert_eq!(artifact.model_id, "unit-test-forest");
        assert_eq!(artifact.n_classes(), 3);
        assert_eq!(artifact.feature_importances().map(|w| w.len()), Some(FEATURE_COUNT));
    }

    #[test]
    fn test_rejects_corrupt_json() {
        let result = ModelArtifact::from_json("{ not json");
        assert!(matches!(result, Err(TriageError::ArtifactLoad(_))));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let json = SAMPLE_ARTIFACT.replace("\"format_version\": 1", "\"format_version\": 2");
        assert!(matches!(ModelArtifact::from_json(&json), Err(TriageError::ArtifactLoad(_))));
    }

    #[test]
    fn test_rejects_reordered_features() {
        let json = SAMPLE_ARTIFACT.replace(
            r#"["age", "gender", "bp""#,
            r#"["gender", "age", "bp""#,
        );
        assert!(ModelArtifact::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_encoder_missing_intake_category() {
        let json = SAMPLE_ARTIFACT.replace(r#"["Asthma", "#, "[");
        assert_ne!(json, SAMPLE_ARTIFACT);
        assert!(matches!(ModelArtifact::from_json(&json), Err(TriageError::ArtifactLoad(_))));

        let json = SAMPLE_ARTIFACT.replace(r#""Severe Headache", "#, "");
        assert_ne!(json, SAMPLE_ARTIFACT);
        assert!(matches!(ModelArtifact::from_json(&json), Err(TriageError::ArtifactLoad(_))));
    }

    #[test]
    fn test_missing_file_is_artifact_error() {
        let result = ModelArtifact::load("/nonexistent/triage/model.json");
        assert!(matches!(result, Err(TriageError::ArtifactLoad(_))));
    }

    #[test]
    fn test_bundled_demo_artifact() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/risk_model.json");
        let artifact = ModelArtifact::load(path).unwrap();

        // 30 岁、血压 120、心率 80、体温 98.6、咳嗽、无既往病史
        let features = FeatureVector([30.0, 1.0, 120.0, 80.0, 98.6, 1.0, 4.0]);
        let probabilities = artifact.predict_probabilities(&features).unwrap();
        assert_eq!(artifact.predict(&features).unwrap(), 1);
        assert!((probabilities[1] - 0.7333).abs() < 1e-3);
    }

    #[test]
    fn test_store_swaps_only_valid_artifacts() {
        let store = ArtifactStore::new(ModelArtifact::from_json(SAMPLE_ARTIFACT).unwrap()).unwrap();
        let before = store.current();

        let mut broken = (*before).clone();
        broken.format_version = 9;
        assert!(store.replace(broken).is_err());
        assert_eq!(store.current().model_id, "unit-test-forest");

        let mut next = (*before).clone();
        next.model_id = "next-forest".to_string();
        store.replace(next).unwrap();
        assert_eq!(store.current().model_id, "next-forest");
        // 旧快照保持不变
        assert_eq!(before.model_id, "unit-test-forest");
    }
}
