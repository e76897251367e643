//! 内置数据集
//!
//! - CIFAR-10：32x32 彩色图像，10 个类别

mod cifar10;

use std::path::PathBuf;

pub use cifar10::{CLASSES as CIFAR10_CLASSES, Cifar10Dataset};

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("only_dcgan")
        .join("datasets")
}
