use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 对每个元素施加`f`，返回新张量
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self::from_array(self.data.mapv(f))
    }

    /// 对两个形状相同的张量逐元素施加`f`
    pub fn zip_map(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Self {
        assert!(
            self.is_same_shape(other),
            "{}",
            TensorError::OperatorError {
                operator: Operator::Mul,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
        let data = self
            .as_slice()
            .iter()
            .zip(other.as_slice())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Self::from_vec(data, self.shape())
    }

    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    /// 将全部元素置为`value`
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// 所有元素之和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 所有元素的均值；空张量返回NaN
    pub fn mean(&self) -> f32 {
        self.sum() / self.size() as f32
    }

    /// 所有元素的（总体）标准差
    pub fn std(&self) -> f32 {
        let mean = self.mean();
        let var = self
            .as_slice()
            .iter()
            .map(|&x| (x - mean) * (x - mean))
            .sum::<f32>()
            / self.size() as f32;
        var.sqrt()
    }

    pub fn min(&self) -> f32 {
        self.as_slice().iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.as_slice()
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// 判断是否所有元素都满足`predicate`
    pub fn all(&self, predicate: impl Fn(f32) -> bool) -> bool {
        self.as_slice().iter().all(|&x| predicate(x))
    }
}
