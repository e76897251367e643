/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-01-17
 * @Description  : 优化器模块，实现 PyTorch 风格的梯度优化算法
 *
 * 梯度不挂在参数上，而是存放在优化器持有的`GradBuffer`中：
 * - `zero_grad()`：按参数形状新建一个全零缓冲区；
 * - 反向传播：把梯度累加进`grads_mut()`返回的缓冲区；
 * - `step()`：用缓冲区更新参数，之后缓冲区被丢弃，下一次更新前必须重新`zero_grad()`。
 */

mod adam;
mod grad_buffer;

pub use adam::Adam;
pub use grad_buffer::GradBuffer;

use crate::nn::NnError;
use crate::nn::module::Module;

/// 优化器 trait（PyTorch 风格）
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = Adam::new(&model, 0.002, 0.5, 0.999, 1e-8);
///
/// optimizer.zero_grad();
/// let output = model.forward(&ctx, &input)?;
/// let loss = criterion.forward(&output, &target)?;
/// model.backward(&loss.grad, optimizer.grads_mut()?)?;
/// optimizer.step(&mut model)?;
/// ```
pub trait Optimizer {
    /// 准备一个全零的梯度缓冲区（替换掉尚未使用的旧缓冲区）
    fn zero_grad(&mut self);

    /// 获取当前梯度缓冲区，供反向传播累加梯度
    fn grads_mut(&mut self) -> Result<&mut GradBuffer, NnError>;

    /// 用累加好的梯度更新`module`的参数，并消耗掉梯度缓冲区
    fn step(&mut self, module: &mut dyn Module) -> Result<(), NnError>;

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（如 Adam 的动量）
    fn reset(&mut self);
}
