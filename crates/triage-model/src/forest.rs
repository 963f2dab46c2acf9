//! 决策森林分类器
//!
//! 从训练产物反序列化的随机森林：每棵树按 `x[feature] <= threshold` 走左子树，
//! 叶子保存各类别的样本分布；森林概率为各树归一化叶子分布的平均值。

use crate::classifier::RiskClassifier;
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use triage_core::{Result, TriageError};

/// 重要性总和允许的浮点误差
const IMPORTANCE_SUM_TOLERANCE: f64 = 1e-6;

/// 树节点
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// 单棵决策树，节点 0 为根
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// 验证树结构
    ///
    /// 子节点下标必须大于父节点下标，保证遍历一定终止。
    fn validate(&self, tree_index: usize, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(TriageError::ArtifactLoad(format!("第 {} 棵树没有节点", tree_index)));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(TriageError::ArtifactLoad(format!(
                            "第 {} 棵树节点 {} 引用了不存在的特征 {}",
                            tree_index, index, feature
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(TriageError::ArtifactLoad(format!(
                            "第 {} 棵树节点 {} 的阈值不是有限值",
                            tree_index, index
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(TriageError::ArtifactLoad(format!(
                                "第 {} 棵树节点 {} 的子节点 {} 非法",
                                tree_index, index, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(TriageError::ArtifactLoad(format!(
                            "第 {} 棵树叶子 {} 的类别数 {} 与模型类别数 {} 不一致",
                            tree_index,
                            index,
                            value.len(),
                            n_classes
                        )));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                        return Err(TriageError::ArtifactLoad(format!(
                            "第 {} 棵树叶子 {} 的分布非法",
                            tree_index, index
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// 沿树下行，返回归一化后的叶子分布
    fn leaf_distribution(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let next = if features.get(*feature)? <= *threshold { *left } else { *right };
                    if next <= index {
                        return Err(TriageError::Classification(format!("树节点 {} 存在回环", index)));
                    }
                    index = next;
                }
                Some(TreeNode::Leaf { value }) => {
                    let total: f64 = value.iter().sum();
                    if total <= 0.0 {
                        return Err(TriageError::Classification(format!("叶子 {} 的分布为空", index)));
                    }
                    return Ok(value.iter().map(|v| v / total).collect());
                }
                None => {
                    return Err(TriageError::Classification(format!("树节点 {} 不存在", index)));
                }
            }
        }
    }
}

/// 决策森林
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

impl DecisionForest {
    /// 验证森林结构与特征重要性
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 || self.n_classes == 0 {
            return Err(TriageError::ArtifactLoad("森林的特征数和类别数必须大于 0".to_string()));
        }
        if self.trees.is_empty() {
            return Err(TriageError::ArtifactLoad("森林中没有决策树".to_string()));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index, self.n_features, self.n_classes)?;
        }

        if let Some(importances) = &self.feature_importances {
            if importances.len() != self.n_features {
                return Err(TriageError::ArtifactLoad(format!(
                    "特征重要性长度 {} 与特征数 {} 不一致",
                    importances.len(),
                    self.n_features
                )));
            }
            if importances.iter().any(|w| !w.is_finite() || *w < 0.0 || *w > 1.0) {
                return Err(TriageError::ArtifactLoad("特征重要性必须在 [0, 1] 内".to_string()));
            }
            if importances.iter().sum::<f64>() > 1.0 + IMPORTANCE_SUM_TOLERANCE {
                return Err(TriageError::ArtifactLoad("特征重要性总和超过 1".to_string()));
            }
        }

        Ok(())
    }
}

impl RiskClassifier for DecisionForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(TriageError::Classification("森林中没有决策树".to_string()));
        }

        let mut sums = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let distribution = tree.leaf_distribution(features)?;
            if distribution.len() != self.n_classes {
                return Err(TriageError::Classification("叶子分布长度与类别数不一致".to_string()));
            }
            for (sum, p) in sums.iter_mut().zip(distribution) {
                *sum += p;
            }
        }

        let tree_count = self.trees.len() as f64;
        Ok(sums.into_iter().map(|sum| sum / tree_count).collect())
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{AGE_SLOT, BP_SLOT, FEATURE_COUNT};

    fn leaf(value: &[f64]) -> TreeNode {
        TreeNode::Leaf { value: value.to_vec() }
    }

    fn split(feature: usize, threshold: f64, left: usize, right: usize) -> TreeNode {
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    fn two_tree_forest() -> DecisionForest {
        DecisionForest {
            n_features: FEATURE_COUNT,
            n_classes: 3,
            trees: vec![
                DecisionTree {
                    nodes: vec![split(BP_SLOT, 150.5, 1, 2), leaf(&[0.0, 8.0, 2.0]), leaf(&[6.0, 0.0, 4.0])],
                },
                DecisionTree {
                    nodes: vec![split(AGE_SLOT, 60.5, 1, 2), leaf(&[0.0, 1.0, 0.0]), leaf(&[0.5, 0.0, 0.5])],
                },
            ],
            feature_importances: Some(vec![0.4, 0.0, 0.6, 0.0, 0.0, 0.0, 0.0]),
        }
    }

    fn vector(age: f64, bp: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[AGE_SLOT] = age;
        values[BP_SLOT] = bp;
        FeatureVector(values)
    }

    #[test]
    fn test_forest_averages_normalized_leaves() {
        let forest = two_tree_forest();
        forest.validate().unwrap();

        let probabilities = forest.predict_probabilities(&vector(30.0, 120.0)).unwrap();
        assert!((probabilities[0] - 0.0).abs() < 1e-12);
        assert!((probabilities[1] - 0.9).abs() < 1e-12);
        assert!((probabilities[2] - 0.1).abs() < 1e-12);
        assert_eq!(forest.predict(&vector(30.0, 120.0)).unwrap(), 1);

        // 阈值相等时走左子树
        let at_threshold = forest.predict_probabilities(&vector(60.5, 150.5)).unwrap();
        assert!((at_threshold[1] - 0.9).abs() < 1e-12);

        let high = forest.predict_probabilities(&vector(75.0, 190.0)).unwrap();
        assert!((high[0] - 0.55).abs() < 1e-12);
        assert_eq!(forest.predict(&vector(75.0, 190.0)).unwrap(), 0);
    }

    #[test]
    fn test_validation_rejects_backward_edges() {
        let mut forest = two_tree_forest();
        forest.trees[0].nodes[0] = split(BP_SLOT, 150.5, 0, 2);
        assert!(matches!(forest.validate(), Err(TriageError::ArtifactLoad(_))));
    }

    #[test]
    fn test_validation_rejects_bad_importances() {
        let mut forest = two_tree_forest();
        forest.feature_importances = Some(vec![0.9, 0.0, 0.6, 0.0, 0.0, 0.0, 0.0]);
        assert!(forest.validate().is_err());

        forest.feature_importances = Some(vec![0.5, 0.5]);
        assert!(forest.validate().is_err());

        forest.feature_importances = None;
        assert!(forest.validate().is_ok());
        assert!(forest.feature_importances().is_none());
    }

    #[test]
    fn test_validation_rejects_wrong_leaf_width() {
        let mut forest = two_tree_forest();
        forest.trees[1].nodes[1] = leaf(&[1.0, 0.0]);
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_node_serde_format() {
        let json = r#"{"kind":"split","feature":2,"threshold":150.5,"left":1,"right":2}"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        assert_eq!(node, split(BP_SLOT, 150.5, 1, 2));
    }
}
