/*
 * @Description  : 网络层。每种层显式实现前向`forward`与反向`backward`：
 *                 - forward 计算输出，并缓存反向传播所需的中间量；
 *                 - backward 接收输出梯度，把参数梯度累加进调用方提供的缓冲区，并返回输入梯度。
 *                 多个层由`Sequential`按顺序组合。
 */

mod activation;
mod batch_norm2d;
mod conv2d;
mod conv_transpose2d;
pub(crate) mod im2col;
mod sequential;

pub use activation::{Activation, ActivationKind};
pub use batch_norm2d::BatchNorm2d;
pub use conv2d::Conv2d;
pub use conv_transpose2d::ConvTranspose2d;
pub use sequential::Sequential;

use crate::context::Context;
use crate::nn::NnError;
use crate::nn::init::InitTarget;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
pub enum Layer {
    Conv2d(Conv2d),
    ConvTranspose2d(ConvTranspose2d),
    BatchNorm2d(BatchNorm2d),
    Activation(Activation),
}

#[enum_dispatch(Layer)]
pub trait TraitLayer {
    fn name(&self) -> &str;

    /// 前向传播，并缓存反向传播需要的中间结果（后一次前向会覆盖前一次的缓存）
    fn forward(&mut self, ctx: &Context, input: &Tensor) -> Result<Tensor, NnError>;

    /// 反向传播：`param_grads`与`parameters()`一一对应，本层参数的梯度被累加（而非覆盖）到其中；
    /// 返回对输入的梯度
    fn backward(
        &mut self,
        grad_output: &Tensor,
        param_grads: &mut [Tensor],
    ) -> Result<Tensor, NnError>;

    fn parameters(&self) -> Vec<&Tensor>;

    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// 本层的类别及可初始化的参数
    fn init_target(&mut self) -> InitTarget<'_>;

    fn num_params(&self) -> usize {
        self.parameters().len()
    }
}

/// 校验输入形状是否为4D [batch, channels, H, W]，返回各维大小
pub(crate) fn expect_4d(
    layer_name: &str,
    input: &Tensor,
    channels: usize,
) -> Result<(usize, usize, usize, usize), NnError> {
    let shape = input.shape();
    if shape.len() != 4 || shape[1] != channels {
        return Err(NnError::ShapeMismatch {
            expected: vec![0, channels, 0, 0],
            got: shape.to_vec(),
            message: format!("{layer_name}的输入必须是4D [batch, {channels}, H, W]"),
        });
    }
    Ok((shape[0], shape[1], shape[2], shape[3]))
}

/// 把本层新算出的参数梯度累加进缓冲区
pub(crate) fn accumulate_grads(
    layer_name: &str,
    param_grads: &mut [Tensor],
    new_grads: &[Tensor],
) -> Result<(), NnError> {
    if param_grads.len() != new_grads.len() {
        return Err(NnError::ParameterCountMismatch {
            expected: new_grads.len(),
            got: param_grads.len(),
        });
    }
    for (slot, grad) in param_grads.iter_mut().zip(new_grads) {
        if !slot.is_same_shape(grad) {
            return Err(NnError::ShapeMismatch {
                expected: grad.shape().to_vec(),
                got: slot.shape().to_vec(),
                message: format!("{layer_name}的梯度缓冲区形状不符"),
            });
        }
        *slot += grad;
    }
    Ok(())
}

/// 校验输出梯度与前向输出形状一致
pub(crate) fn expect_grad_shape(
    layer_name: &str,
    grad_output: &Tensor,
    expected: &[usize],
) -> Result<(), NnError> {
    if grad_output.shape() != expected {
        return Err(NnError::ShapeMismatch {
            expected: expected.to_vec(),
            got: grad_output.shape().to_vec(),
            message: format!("{layer_name}的输出梯度形状必须与前向输出一致"),
        });
    }
    Ok(())
}
