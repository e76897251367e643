/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-01-17
 * @Description  : 负责神经网络（neural network）的构建
 */

pub mod criterion;
mod error;
pub mod init;
pub mod layer;
mod module;
pub mod optimizer;

pub use criterion::{BCELoss, LossOutput};
pub use error::NnError;
pub use init::{Init, InitTarget, WeightInit};
pub use layer::{
    Activation, ActivationKind, BatchNorm2d, Conv2d, ConvTranspose2d, Layer, Sequential,
    TraitLayer,
};
pub use module::Module;
pub use optimizer::{Adam, GradBuffer, Optimizer};

#[cfg(test)]
mod tests;
