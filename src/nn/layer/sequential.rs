/*
 * @Description  : Sequential：按顺序组合多个层
 *
 * 前向依次调用各层；反向按相反顺序调用，并把梯度缓冲区按各层参数个数切分后分别交给对应的层。
 * 参数顺序即各层参数按层顺序拼接，与`GradBuffer`的槽位一一对应。
 */

use super::{Layer, TraitLayer};
use crate::context::Context;
use crate::nn::NnError;
use crate::nn::module::Module;
use crate::nn::optimizer::GradBuffer;
use crate::tensor::Tensor;

#[derive(Default)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// 追加一层（builder 风格）
    pub fn push(mut self, layer: impl Into<Layer>) -> Self {
        self.layers.push(layer.into());
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// 对每一层调用`f`
    pub fn apply(&mut self, mut f: impl FnMut(&mut Layer)) {
        self.layers.iter_mut().for_each(|layer| f(layer));
    }

    pub fn forward(&mut self, ctx: &Context, input: &Tensor) -> Result<Tensor, NnError> {
        let mut iter = self.layers.iter_mut();
        let Some(first) = iter.next() else {
            return Ok(input.clone());
        };
        let mut output = first.forward(ctx, input)?;
        for layer in iter {
            output = layer.forward(ctx, &output)?;
        }
        Ok(output)
    }

    /// 反向传播：参数梯度累加进`grads`，返回对输入的梯度
    pub fn backward(
        &mut self,
        grad_output: &Tensor,
        grads: &mut GradBuffer,
    ) -> Result<Tensor, NnError> {
        self.backward_into(grad_output, grads.slots_mut())
    }

    /// 同`backward`，梯度槽位以切片给出（须与`parameters()`一一对应）
    pub fn backward_into(
        &mut self,
        grad_output: &Tensor,
        param_grads: &mut [Tensor],
    ) -> Result<Tensor, NnError> {
        let expected = self.num_params();
        if param_grads.len() != expected {
            return Err(NnError::ParameterCountMismatch {
                expected,
                got: param_grads.len(),
            });
        }

        let mut grad = grad_output.clone();
        let mut remaining = param_grads;
        for layer in self.layers.iter_mut().rev() {
            let split = remaining.len() - layer.num_params();
            let (head, tail) = std::mem::take(&mut remaining).split_at_mut(split);
            grad = layer.backward(&grad, tail)?;
            remaining = head;
        }
        Ok(grad)
    }
}

impl Module for Sequential {
    fn parameters(&self) -> Vec<&Tensor> {
        self.layers
            .iter()
            .flat_map(|layer| layer.parameters())
            .collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.parameters_mut())
            .collect()
    }
}
