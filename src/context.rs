/*
 * @Description  : 执行上下文：显式持有随机数源与训练/推理模式，
 *                 在网络构建（参数初始化）与前向传播时逐层传入，取代隐式的全局状态。
 */

use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// 前向传播模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// 训练模式：批归一化使用当前批次统计量，并更新滑动统计量
    #[default]
    Train,
    /// 推理模式：批归一化使用滑动统计量
    Eval,
}

pub struct Context {
    rng: StdRng,
    mode: Mode,
}

impl Context {
    /// 以系统熵为种子创建上下文
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            mode: Mode::Train,
        }
    }

    /// 以固定种子创建上下文，确保可重复
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            mode: Mode::Train,
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn is_training(&self) -> bool {
        self.mode == Mode::Train
    }

    /// 采样一个标准正态分布的张量（如潜空间噪声）
    pub fn randn(&mut self, shape: &[usize]) -> Tensor {
        Tensor::normal_with_rng(0.0, 1.0, shape, &mut self.rng)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
