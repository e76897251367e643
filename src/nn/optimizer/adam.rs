/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:30:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-01-17
 * @Description  : Adam优化器实现
 */

use super::{GradBuffer, Optimizer};
use crate::nn::NnError;
use crate::nn::module::Module;
use crate::tensor::Tensor;

/// Adam: Adaptive Moment Estimation
/// - m = β1 * m + (1 - β1) * g
/// - v = β2 * v + (1 - β2) * g²
/// - θ = θ - α * m_hat / (√v_hat + ε)
///
/// 每个优化器只绑定一个模块（GAN 训练中 G 和 D 各用一个）。
pub struct Adam {
    /// 绑定模块的参数形状（按参数顺序）
    shapes: Vec<Vec<usize>>,
    /// 学习率
    lr: f32,
    /// β1 (一阶矩衰减)
    beta1: f32,
    /// β2 (二阶矩衰减)
    beta2: f32,
    /// 数值稳定项
    epsilon: f32,
    /// 一阶矩估计
    m: Vec<Tensor>,
    /// 二阶矩估计
    v: Vec<Tensor>,
    /// 时间步
    t: usize,
    /// 当前梯度缓冲区
    grads: Option<GradBuffer>,
}

impl Adam {
    /// 创建新的Adam优化器
    ///
    /// # 参数
    /// - `module`: 要优化的模块（仅读取其参数形状）
    /// - `lr`: 学习率
    /// - `beta1`/`beta2`: 一阶/二阶矩衰减率
    /// - `epsilon`: 数值稳定项
    pub fn new(module: &dyn Module, lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        let shapes: Vec<Vec<usize>> = module
            .parameters()
            .iter()
            .map(|p| p.shape().to_vec())
            .collect();
        let zeros = || shapes.iter().map(|s| Tensor::zeros(s)).collect::<Vec<_>>();
        let (m, v) = (zeros(), zeros());
        Self {
            shapes,
            lr,
            beta1,
            beta2,
            epsilon,
            m,
            v,
            t: 0,
            grads: None,
        }
    }

    /// 使用默认参数（β1=0.9，β2=0.999，ε=1e-8）创建Adam优化器
    pub fn new_default(module: &dyn Module, lr: f32) -> Self {
        Self::new(module, lr, 0.9, 0.999, 1e-8)
    }

    /// 已执行的更新步数
    pub const fn timestep(&self) -> usize {
        self.t
    }
}

impl Optimizer for Adam {
    fn zero_grad(&mut self) {
        self.grads = Some(GradBuffer::zeros(&self.shapes));
    }

    fn grads_mut(&mut self) -> Result<&mut GradBuffer, NnError> {
        self.grads.as_mut().ok_or(NnError::GradientsNotPrepared)
    }

    fn step(&mut self, module: &mut dyn Module) -> Result<(), NnError> {
        let grads = self.grads.take().ok_or(NnError::GradientsNotPrepared)?;
        let mut params = module.parameters_mut();
        if params.len() != self.shapes.len() {
            return Err(NnError::ParameterCountMismatch {
                expected: self.shapes.len(),
                got: params.len(),
            });
        }

        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        for (((param, grad), m), v) in params
            .iter_mut()
            .zip(grads.grads())
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            if !param.is_same_shape(grad) {
                return Err(NnError::ShapeMismatch {
                    expected: param.shape().to_vec(),
                    got: grad.shape().to_vec(),
                    message: "梯度与参数形状不一致".to_string(),
                });
            }

            // 更新一阶矩
            *m *= self.beta1;
            *m += &(grad * (1.0 - self.beta1));

            // 更新二阶矩
            *v *= self.beta2;
            *v += &(&(grad * grad) * (1.0 - self.beta2));

            // 偏差修正
            let m_hat = &*m / bias_correction1;
            let v_hat = &*v / bias_correction2;

            // 更新参数
            let denom = &v_hat.sqrt() + self.epsilon;
            let update = &(&m_hat / &denom) * self.lr;
            **param = &**param - &update;
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.m.iter_mut().for_each(|m| m.fill(0.0));
        self.v.iter_mut().for_each(|v| v.fill(0.0));
        self.t = 0;
        self.grads = None;
    }
}
