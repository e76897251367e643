/*
 * @Description  : 参数初始化
 *
 * - `Init`：单个张量的初始化方式
 * - `InitTarget`：由各层给出的“层类别 + 可初始化的参数”，显式的枚举取代按类名字符串匹配
 * - `WeightInit`：按层类别给出的初始化策略（纯数据），对网络的每一层恰好施加一次
 */

use crate::nn::layer::{Layer, Sequential, TraitLayer};
use crate::tensor::Tensor;
use rand::Rng;

/// 参数初始化方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate<R: Rng + ?Sized>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => {
                let std = (2.0 / fan_in(shape) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }

    /// 原地重新初始化`tensor`（形状不变）
    pub fn apply<R: Rng + ?Sized>(&self, tensor: &mut Tensor, rng: &mut R) {
        *tensor = self.generate(tensor.shape(), rng);
    }
}

/// 计算扇入：卷积核[out, in, kh, kw]（或转置卷积核[in, out, kh, kw]）取后3维之积，矩阵取第0维
fn fan_in(shape: &[usize]) -> usize {
    match shape.len() {
        0 => 1,
        1 | 2 => shape[0],
        _ => shape[1..].iter().product(),
    }
}

/// 层类别及其可被初始化的参数
pub enum InitTarget<'a> {
    /// 卷积类（含转置卷积）：只有卷积核
    Convolution { weight: &'a mut Tensor },
    /// 归一化类：缩放（gamma）与平移（beta）
    Normalization {
        scale: &'a mut Tensor,
        shift: &'a mut Tensor,
    },
    /// 其他层（激活函数等），保持默认初始化
    Other,
}

/// 按层类别区分的初始化策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightInit {
    pub conv_weight: Init,
    pub norm_scale: Init,
    pub norm_shift: Init,
}

impl WeightInit {
    /// DCGAN 的初始化策略：卷积核~N(0, 0.02)，BN 的 gamma~N(1, 0.02)、beta=0
    pub const fn dcgan() -> Self {
        Self {
            conv_weight: Init::Normal {
                mean: 0.0,
                std: 0.02,
            },
            norm_scale: Init::Normal {
                mean: 1.0,
                std: 0.02,
            },
            norm_shift: Init::Zeros,
        }
    }

    /// 对单个层施加策略
    pub fn apply_to_layer<R: Rng + ?Sized>(&self, layer: &mut Layer, rng: &mut R) {
        match layer.init_target() {
            InitTarget::Convolution { weight } => self.conv_weight.apply(weight, rng),
            InitTarget::Normalization { scale, shift } => {
                self.norm_scale.apply(scale, rng);
                self.norm_shift.apply(shift, rng);
            }
            InitTarget::Other => {}
        }
    }

    /// 对网络中的每一层施加策略
    pub fn apply<R: Rng + ?Sized>(&self, network: &mut Sequential, rng: &mut R) {
        network.apply(|layer| self.apply_to_layer(layer, &mut *rng));
    }
}

impl Default for WeightInit {
    fn default() -> Self {
        Self::dcgan()
    }
}
