/*
 * @Description  : 逐元素激活函数层（无参数）
 */

use super::{TraitLayer, expect_grad_shape};
use crate::context::Context;
use crate::nn::NnError;
use crate::nn::init::InitTarget;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivationKind {
    ReLU,
    /// 负半轴斜率
    LeakyReLU(f32),
    Tanh,
    Sigmoid,
}

impl ActivationKind {
    fn apply(self, x: f32) -> f32 {
        match self {
            Self::ReLU => x.max(0.0),
            Self::LeakyReLU(slope) => {
                if x > 0.0 {
                    x
                } else {
                    slope * x
                }
            }
            Self::Tanh => x.tanh(),
            Self::Sigmoid => stable_sigmoid(x),
        }
    }

    /// 以前向的输入x与输出y求局部导数
    fn derivative(self, x: f32, y: f32) -> f32 {
        match self {
            Self::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::LeakyReLU(slope) => {
                if x > 0.0 {
                    1.0
                } else {
                    slope
                }
            }
            Self::Tanh => 1.0 - y * y,
            Self::Sigmoid => y * (1.0 - y),
        }
    }
}

/// 数值稳定的sigmoid：避免对大的负数求exp(-x)溢出
fn stable_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

pub struct Activation {
    name: String,
    kind: ActivationKind,
    /// 前向的(输入, 输出)
    cache: Option<(Tensor, Tensor)>,
}

impl Activation {
    pub fn new(kind: ActivationKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            cache: None,
        }
    }

    pub fn relu(name: &str) -> Self {
        Self::new(ActivationKind::ReLU, name)
    }

    pub fn leaky_relu(slope: f32, name: &str) -> Self {
        Self::new(ActivationKind::LeakyReLU(slope), name)
    }

    pub fn tanh(name: &str) -> Self {
        Self::new(ActivationKind::Tanh, name)
    }

    pub fn sigmoid(name: &str) -> Self {
        Self::new(ActivationKind::Sigmoid, name)
    }

    pub const fn kind(&self) -> ActivationKind {
        self.kind
    }
}

impl TraitLayer for Activation {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, _ctx: &Context, input: &Tensor) -> Result<Tensor, NnError> {
        let kind = self.kind;
        let output = input.map(|x| kind.apply(x));
        self.cache = Some((input.clone(), output.clone()));
        Ok(output)
    }

    fn backward(
        &mut self,
        grad_output: &Tensor,
        _param_grads: &mut [Tensor],
    ) -> Result<Tensor, NnError> {
        let (input, output) = self
            .cache
            .as_ref()
            .ok_or_else(|| NnError::BackwardBeforeForward(self.name.clone()))?;
        expect_grad_shape(&self.name, grad_output, output.shape())?;

        let kind = self.kind;
        let local = input.zip_map(output, |x, y| kind.derivative(x, y));
        Ok(&local * grad_output)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    fn init_target(&mut self) -> InitTarget<'_> {
        InitTarget::Other
    }
}
