//! 数据加载模块
//!
//! 提供数据集加载、变换和批处理功能。
//!
//! # 主要组件
//!
//! - [`DataLoader`]: `PyTorch` 风格的数据批量加载器
//! - [`Dataset`]: 可按索引读取样本的数据集 trait
//! - [`TensorDataset`]: 持有特征和标签的数据集
//! - [`Cifar10Dataset`]: CIFAR-10 彩色图像数据集
//! - [`transforms`]: 图像变换（缩放、归一化）
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use only_dcgan::data::{Cifar10Dataset, DataLoader};
//!
//! let dataset = Cifar10Dataset::load(Some("./data"), true, true)?;
//! let loader = DataLoader::new(dataset, 44).shuffle(true);
//!
//! for batch in loader.iter() {
//!     let (images, _labels) = batch?;
//!     // images: [44, 3, 64, 64]，值域 [-1, 1]
//! }
//! ```

mod dataloader;
pub mod datasets;
pub mod download;
pub mod error;
pub mod transforms;

#[cfg(test)]
mod tests;

// Re-exports
pub use dataloader::{DataLoader, DataLoaderIterator, Dataset, TensorDataset};
pub use datasets::{CIFAR10_CLASSES, Cifar10Dataset, default_data_dir};
pub use error::DataError;
pub use transforms::ImageTransform;
