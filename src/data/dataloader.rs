/*
 * @Author       : 老董
 * @Date         : 2025-01-21
 * @Description  : DataLoader - PyTorch 风格的数据批量加载器
 *
 * 提供统一的数据迭代 API，支持：
 * - 自动分批 (batch_size)
 * - 随机打乱 (shuffle)，每次`iter()`（即每个 epoch）重新打乱
 * - 丢弃不完整批次 (drop_last)
 * - 批内样本用 Rayon 并行读取与变换
 */

use std::cell::Cell;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use super::error::DataError;
use crate::tensor::Tensor;

/// 可按索引读取样本的数据集
///
/// `get`返回 (输入, 标签)；同一数据集内所有样本的输入形状相同，标签形状也相同。
pub trait Dataset: Sync {
    /// 样本数量
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读取第 index 个样本
    fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError>;
}

/// TensorDataset - 持有特征和标签的数据集
///
/// # 示例
/// ```ignore
/// let dataset = TensorDataset::new(features, labels)?;
/// println!("样本数: {}", dataset.len());
/// ```
#[derive(Debug, Clone)]
pub struct TensorDataset {
    features: Tensor,
    labels: Tensor,
    len: usize,
}

impl TensorDataset {
    /// 创建新的 TensorDataset
    ///
    /// # 参数
    /// - `features`: 特征张量，第一维为样本数
    /// - `labels`: 标签张量，第一维为样本数（必须与 features 一致）
    pub fn new(features: Tensor, labels: Tensor) -> Result<Self, DataError> {
        let (Some(&len), Some(&label_len)) = (features.shape().first(), labels.shape().first())
        else {
            return Err(DataError::FormatError(
                "TensorDataset: features 和 labels 至少要有一维（样本维）".to_string(),
            ));
        };
        if len != label_len {
            return Err(DataError::ShapeMismatch {
                expected: vec![len],
                got: vec![label_len],
            });
        }
        Ok(Self {
            features,
            labels,
            len,
        })
    }

    /// 获取特征张量引用
    pub fn features(&self) -> &Tensor {
        &self.features
    }

    /// 获取标签张量引用
    pub fn labels(&self) -> &Tensor {
        &self.labels
    }
}

/// 取出张量第0维上的第 index 个切片
fn sample_of(tensor: &Tensor, index: usize) -> Tensor {
    let sample_shape = &tensor.shape()[1..];
    let sample_size: usize = sample_shape.iter().product();
    let start = index * sample_size;
    Tensor::new(&tensor.as_slice()[start..start + sample_size], sample_shape)
}

impl Dataset for TensorDataset {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError> {
        if index >= self.len {
            return Err(DataError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok((sample_of(&self.features, index), sample_of(&self.labels, index)))
    }
}

/// DataLoader - PyTorch 风格的数据批量加载器
///
/// # 示例
/// ```ignore
/// let loader = DataLoader::new(dataset, 44)
///     .shuffle(true)
///     .seed(42);
///
/// for batch in loader.iter() {
///     let (images, labels) = batch?;
///     trainer.train_step(&images)?;
/// }
/// ```
pub struct DataLoader<D: Dataset> {
    dataset: D,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
    /// 已创建的迭代器个数，与种子一起决定每个 epoch 的打乱顺序
    epoch: Cell<u64>,
}

impl<D: Dataset> DataLoader<D> {
    /// 创建新的 DataLoader
    ///
    /// # 参数
    /// - `dataset`: 数据集
    /// - `batch_size`: 批大小
    pub fn new(dataset: D, batch_size: usize) -> Self {
        assert!(batch_size > 0, "DataLoader: batch_size 必须大于 0");
        Self {
            dataset,
            batch_size,
            shuffle: false,
            drop_last: false,
            seed: None,
            epoch: Cell::new(0),
        }
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 获取数据集大小
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// 创建迭代器（一个 epoch）
    pub fn iter(&self) -> DataLoaderIterator<'_, D> {
        let n = self.dataset.len();
        let mut indices: Vec<usize> = (0..n).collect();

        let epoch = self.epoch.get();
        self.epoch.set(epoch + 1);

        if self.shuffle {
            if let Some(seed) = self.seed {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(epoch));
                indices.shuffle(&mut rng);
            } else {
                let mut rng = rand::thread_rng();
                indices.shuffle(&mut rng);
            }
        }

        DataLoaderIterator {
            loader: self,
            indices,
            current_batch: 0,
        }
    }
}

/// DataLoader 迭代器
pub struct DataLoaderIterator<'a, D: Dataset> {
    loader: &'a DataLoader<D>,
    indices: Vec<usize>,
    current_batch: usize,
}

impl<D: Dataset> Iterator for DataLoaderIterator<'_, D> {
    type Item = Result<(Tensor, Tensor), DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.indices.len();
        let batch_size = self.loader.batch_size;
        let start = self.current_batch * batch_size;

        // 检查是否还有数据
        if start >= n {
            return None;
        }

        let end = (start + batch_size).min(n);

        // 如果 drop_last 且批次不完整，则跳过
        if self.loader.drop_last && end - start < batch_size {
            return None;
        }

        self.current_batch += 1;
        Some(extract_batch(
            &self.loader.dataset,
            &self.indices[start..end],
        ))
    }
}

/// 从数据集中按索引并行读取样本并堆叠成批次
fn extract_batch<D: Dataset>(
    dataset: &D,
    indices: &[usize],
) -> Result<(Tensor, Tensor), DataError> {
    let samples: Vec<(Tensor, Tensor)> = indices
        .par_iter()
        .map(|&index| dataset.get(index))
        .collect::<Result<_, _>>()?;
    let (inputs, labels): (Vec<Tensor>, Vec<Tensor>) = samples.into_iter().unzip();
    Ok((Tensor::stack(&inputs)?, Tensor::stack(&labels)?))
}
