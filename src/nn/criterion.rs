/*
 * @Author       : 老董
 * @Date         : 2025-01-21
 * @Description  : 损失函数封装（PyTorch 风格 API）
 *
 * 损失函数一次性给出损失值与对输入的梯度，梯度随后交给网络的`backward`。
 *
 * ```ignore
 * let criterion = BCELoss::new();
 * let output = discriminator.forward(&ctx, &images)?;
 * let loss = criterion.forward(&output, &labels)?;
 * discriminator.backward(&loss.grad, optimizer.grads_mut()?)?;
 * ```
 */

use super::NnError;
use crate::tensor::Tensor;

/// 对数的下限，与 PyTorch 的 BCELoss 一致，避免log(0)得到无穷大
const LOG_CLAMP: f32 = -100.0;
/// 梯度分母的下限
const GRAD_EPS: f32 = 1e-12;

/// 损失值及其对输入的梯度
#[derive(Debug, Clone, PartialEq)]
pub struct LossOutput {
    pub value: f32,
    pub grad: Tensor,
}

// ==================== BCELoss ====================

/// 二元交叉熵损失（均值归约）
///
/// loss = -mean(t·log(p) + (1-t)·log(1-p))，其中log的结果被截断到不小于-100。
/// 输入p须为概率（通常由Sigmoid给出），目标t通常取0或1。
#[derive(Debug, Clone, Copy, Default)]
pub struct BCELoss;

impl BCELoss {
    pub const fn new() -> Self {
        Self
    }

    pub fn forward(&self, input: &Tensor, target: &Tensor) -> Result<LossOutput, NnError> {
        if !input.is_same_shape(target) {
            return Err(NnError::ShapeMismatch {
                expected: input.shape().to_vec(),
                got: target.shape().to_vec(),
                message: "BCELoss的目标形状必须与输入一致".to_string(),
            });
        }
        if input.size() == 0 {
            return Err(NnError::InvalidOperation("BCELoss的输入不能为空".to_string()));
        }

        let n = input.size() as f32;
        let total: f32 = input
            .as_slice()
            .iter()
            .zip(target.as_slice())
            .map(|(&p, &t)| {
                let log_p = p.ln().max(LOG_CLAMP);
                let log_1mp = (1.0 - p).ln().max(LOG_CLAMP);
                -(t * log_p + (1.0 - t) * log_1mp)
            })
            .sum();

        let grad = input.zip_map(target, |p, t| (p - t) / (p * (1.0 - p)).max(GRAD_EPS) / n);

        Ok(LossOutput {
            value: total / n,
            grad,
        })
    }
}
