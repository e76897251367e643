//! # Only DCGAN
//!
//! `only_dcgan`用纯rust实现[DCGAN](https://arxiv.org/abs/1511.06434)：
//! 在CIFAR-10上交替训练卷积生成器与判别器，并定期导出样本网格图。
//!
//! 各模块自底向上：`tensor`（张量）→ `nn`（层、损失、优化器）→ `data`（数据集与加载器）
//! → `vision`（网格图导出）→ `gan`（模型与训练流程）。

pub mod context;
pub mod data;
pub mod errors;
pub mod gan;
pub mod nn;
pub mod tensor;
pub mod vision;
