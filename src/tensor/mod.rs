use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;

mod ops {
    pub mod arith;
    pub mod others;
}

mod property;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：内部数组始终保持标准（行优先、连续）内存布局，`as_slice`等接口依赖这一点。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]...
    /// 注：除了`data`长度为1且shape为`[]`的情况（标量），`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        Self::from_vec(data.to_vec(), shape)
    }

    /// 同`new`，但直接接管`data`的所有权，避免一次拷贝
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Self {
        let data_len = data.len();
        let data = Array::from_shape_vec(IxDyn(shape), data).unwrap_or_else(|_| {
            panic!("数据长度{data_len}与形状{shape:?}不匹配")
        });
        Self { data }
    }

    /// 由任意布局的ndarray数组构建张量（必要时会转为标准布局）
    pub(crate) fn from_array(data: ArrayD<f32>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self { data }
    }

    /// 创建一个所有元素均为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(0.0, shape)
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::full(1.0, shape)
    }

    /// 创建一个与`other`形状相同的全零张量
    pub fn zeros_like(other: &Self) -> Self {
        Self::zeros(other.shape())
    }

    /// 创建一个服从正态分布N(mean, std_dev²)的随机张量，随机源由调用方提供。
    /// 使用Box-Muller变换，一次产生2个独立样本。
    pub fn normal_with_rng<R: Rng + ?Sized>(
        mean: f32,
        std_dev: f32,
        shape: &[usize],
        rng: &mut R,
    ) -> Self {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::from_vec(data, shape)
    }

    /// 将若干形状相同的张量沿新增的第0维堆叠，如n个[c,h,w]堆叠为[n,c,h,w]
    pub fn stack(tensors: &[Self]) -> Result<Self, crate::errors::TensorError> {
        let first = tensors
            .first()
            .ok_or(crate::errors::TensorError::EmptyList)?;
        let sample_shape = first.shape().to_vec();
        if tensors.iter().any(|t| t.shape() != sample_shape.as_slice()) {
            return Err(crate::errors::TensorError::InconsitentShape);
        }

        let mut data = Vec::with_capacity(first.size() * tensors.len());
        for tensor in tensors {
            data.extend_from_slice(tensor.as_slice());
        }

        let mut shape = vec![tensors.len()];
        shape.extend_from_slice(&sample_shape);
        Ok(Self::from_vec(data, &shape))
    }
}
