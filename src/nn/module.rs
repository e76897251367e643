/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Module trait 定义
 */

use crate::tensor::Tensor;

/// 模块 trait
///
/// # 设计原则
/// - `forward()`/`backward()` **不是** trait 方法（各网络的输入输出约定各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()`/`parameters_mut()` 签名一致，放入 trait，供优化器使用
///
/// 两者返回的参数顺序必须一致，梯度缓冲区按此顺序与参数一一对应。
pub trait Module {
    /// 获取所有可训练参数
    fn parameters(&self) -> Vec<&Tensor>;

    /// 获取所有可训练参数的可变引用（仅优化器在`step`中使用）
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// 获取参数（张量）个数
    fn num_params(&self) -> usize {
        self.parameters().len()
    }

    /// 获取参数中标量元素的总数
    fn num_elements(&self) -> usize {
        self.parameters().iter().map(|p| p.size()).sum()
    }
}
