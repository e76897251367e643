/*
 * @Description  : 训练配置
 *
 * 默认值即 DCGAN 在 CIFAR-10 上的标准设置；可从 JSON 文件整体或部分覆盖（缺省字段取默认值）。
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::GanError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// 数据集缓存目录
    pub data_root: String,
    /// 样本图的输出目录（必须已存在）
    pub results_dir: String,
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    /// 每隔多少个批次导出一次样本图（按从0开始的批次序号，0表示不导出）
    pub sample_interval: usize,
    /// 随机种子，None 则使用系统熵
    pub seed: Option<u64>,
    pub shuffle: bool,
    /// 数据集缺失时是否自动下载
    pub download: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_root: "./data".to_string(),
            results_dir: "./results".to_string(),
            batch_size: 44,
            epochs: 25,
            learning_rate: 0.002,
            beta1: 0.5,
            beta2: 0.999,
            epsilon: 1e-8,
            sample_interval: 100,
            seed: None,
            shuffle: true,
            download: true,
        }
    }
}

impl TrainConfig {
    /// 从 JSON 文件读取配置
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GanError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 检查配置是否可用于训练
    pub fn validate(&self) -> Result<(), GanError> {
        if self.batch_size == 0 {
            return Err(GanError::Config("batch_size 必须大于 0".to_string()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(GanError::Config(format!(
                "learning_rate 必须为正数，实际为 {}",
                self.learning_rate
            )));
        }
        for (name, beta) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(GanError::Config(format!(
                    "{name} 必须位于 [0, 1)，实际为 {beta}"
                )));
            }
        }
        Ok(())
    }

    pub fn data_root(mut self, data_root: impl Into<String>) -> Self {
        self.data_root = data_root.into();
        self
    }

    pub fn results_dir(mut self, results_dir: impl Into<String>) -> Self {
        self.results_dir = results_dir.into();
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn sample_interval(mut self, sample_interval: usize) -> Self {
        self.sample_interval = sample_interval;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }
}
