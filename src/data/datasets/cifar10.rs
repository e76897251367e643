//! CIFAR-10 彩色图像数据集
//!
//! 支持：
//! - 官方二进制格式解析（每条记录 1 字节标签 + 3072 字节按通道平铺的 32x32 RGB 像素）
//! - 读取时按 [`ImageTransform`] 缩放与归一化
//! - 可选自动下载（tar.gz，含 MD5 校验）

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::info;

use super::default_data_dir;
use crate::data::dataloader::Dataset;
use crate::data::download::{download_file, extract_tar_gz};
use crate::data::error::DataError;
use crate::data::transforms::ImageTransform;
use crate::tensor::Tensor;

/// CIFAR-10 下载地址（二进制版本）
const CIFAR10_URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";
const CIFAR10_ARCHIVE: &str = "cifar-10-binary.tar.gz";
const CIFAR10_MD5: &str = "c32a1d4ab5d03f1284b67883e8d87530";
/// 压缩包解压后的目录名
const CIFAR10_DIR: &str = "cifar-10-batches-bin";

const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const TEST_FILE: &str = "test_batch.bin";

/// 图像边长
pub const IMAGE_SIDE: u32 = 32;
/// 每条记录的字节数
const RECORD_LEN: usize = 1 + 3 * (IMAGE_SIDE * IMAGE_SIDE) as usize;

/// 10 个类别的名称，下标即标签值
pub const CLASSES: [&str; 10] = [
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

/// CIFAR-10 数据集
///
/// 包含 50,000 个训练样本和 10,000 个测试样本。
/// 原始图像常驻内存，变换在`get`时按需进行。
#[derive(Debug, Clone)]
pub struct Cifar10Dataset {
    images: Vec<RgbImage>,
    labels: Vec<u8>,
    transform: ImageTransform,
}

impl Cifar10Dataset {
    /// 完整加载 API
    ///
    /// # 参数
    /// - `root`: 数据目录，None 则使用默认 (~/.cache/only_dcgan/datasets/cifar10)
    /// - `train`: true=训练集(50000), false=测试集(10000)
    /// - `download`: true=自动下载缺失文件
    pub fn load(root: Option<&str>, train: bool, download: bool) -> Result<Self, DataError> {
        let data_dir = root
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir().join("cifar10"));
        let batches_dir = ensure_extracted(&data_dir, download)?;

        let files: &[&str] = if train { &TRAIN_FILES } else { &[TEST_FILE] };
        let mut bytes = Vec::new();
        for file in files {
            let path = batches_dir.join(file);
            let content =
                std::fs::read(&path).map_err(|_| DataError::FileNotFound(path.clone()))?;
            bytes.extend_from_slice(&content);
        }

        let dataset = Self::from_bytes(&bytes)?;
        info!(
            "已加载 CIFAR-10 {}集：{} 个样本（{:?}）",
            if train { "训练" } else { "测试" },
            dataset.len(),
            batches_dir
        );
        Ok(dataset)
    }

    /// 便捷 API：加载训练集（默认路径，自动下载）
    pub fn train() -> Result<Self, DataError> {
        Self::load(None, true, true)
    }

    /// 便捷 API：加载测试集（默认路径，自动下载）
    pub fn test() -> Result<Self, DataError> {
        Self::load(None, false, true)
    }

    /// 从内存中的二进制记录构建数据集
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DataError> {
        if bytes.len() % RECORD_LEN != 0 {
            return Err(DataError::FormatError(format!(
                "CIFAR-10 数据长度 {} 不是记录长度 {RECORD_LEN} 的整数倍",
                bytes.len()
            )));
        }

        let mut images = Vec::with_capacity(bytes.len() / RECORD_LEN);
        let mut labels = Vec::with_capacity(bytes.len() / RECORD_LEN);
        for record in bytes.chunks_exact(RECORD_LEN) {
            let label = record[0];
            if usize::from(label) >= CLASSES.len() {
                return Err(DataError::FormatError(format!("无效的标签: {label}")));
            }
            labels.push(label);
            images.push(decode_planar(&record[1..]));
        }

        Ok(Self {
            images,
            labels,
            transform: ImageTransform::default(),
        })
    }

    /// 替换样本变换
    pub fn with_transform(mut self, transform: ImageTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn transform(&self) -> &ImageTransform {
        &self.transform
    }

    /// 第 index 个样本的原始图像
    pub fn image(&self, index: usize) -> Option<&RgbImage> {
        self.images.get(index)
    }

    /// 第 index 个样本的标签
    pub fn label(&self, index: usize) -> Option<u8> {
        self.labels.get(index).copied()
    }
}

impl Dataset for Cifar10Dataset {
    fn len(&self) -> usize {
        self.labels.len()
    }

    /// 返回 (image, label)
    /// - image: [3, size, size]
    /// - label: 标量（形状 []）
    fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError> {
        let image = self.images.get(index).ok_or(DataError::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;
        let label = Tensor::new(&[f32::from(self.labels[index])], &[]);
        Ok((self.transform.apply(image), label))
    }
}

/// 把按通道平铺的像素（先 1024 个 R，再 G，再 B）转为 RGB 图像
fn decode_planar(pixels: &[u8]) -> RgbImage {
    let plane = (IMAGE_SIDE * IMAGE_SIDE) as usize;
    RgbImage::from_fn(IMAGE_SIDE, IMAGE_SIDE, |x, y| {
        let offset = (y * IMAGE_SIDE + x) as usize;
        image::Rgb([
            pixels[offset],
            pixels[plane + offset],
            pixels[2 * plane + offset],
        ])
    })
}

/// 确保解压后的目录存在，必要时下载并解压
fn ensure_extracted(data_dir: &Path, download: bool) -> Result<PathBuf, DataError> {
    let batches_dir = data_dir.join(CIFAR10_DIR);
    if batches_dir.is_dir() {
        return Ok(batches_dir);
    }

    let archive_path = data_dir.join(CIFAR10_ARCHIVE);
    if !archive_path.exists() {
        if !download {
            return Err(DataError::FileNotFound(batches_dir));
        }
        std::fs::create_dir_all(data_dir)?;
        download_file(CIFAR10_URL, &archive_path, Some(CIFAR10_MD5))?;
    }

    extract_tar_gz(&archive_path, data_dir)?;
    if batches_dir.is_dir() {
        Ok(batches_dir)
    } else {
        Err(DataError::DecompressionError(format!(
            "{archive_path:?} 中没有 {CIFAR10_DIR} 目录"
        )))
    }
}
