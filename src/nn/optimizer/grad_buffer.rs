/*
 * @Description  : 梯度缓冲区：与模块参数一一对应（同顺序、同形状）的梯度张量
 */

use crate::nn::module::Module;
use crate::tensor::Tensor;

#[derive(Debug, Clone, PartialEq)]
pub struct GradBuffer {
    grads: Vec<Tensor>,
}

impl GradBuffer {
    /// 按给定的参数形状新建全零缓冲区
    pub fn zeros(shapes: &[Vec<usize>]) -> Self {
        Self {
            grads: shapes.iter().map(|shape| Tensor::zeros(shape)).collect(),
        }
    }

    /// 按模块当前的参数形状新建全零缓冲区
    pub fn for_module(module: &dyn Module) -> Self {
        Self {
            grads: module
                .parameters()
                .into_iter()
                .map(Tensor::zeros_like)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.grads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grads.is_empty()
    }

    pub fn grads(&self) -> &[Tensor] {
        &self.grads
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Tensor] {
        &mut self.grads
    }
}
