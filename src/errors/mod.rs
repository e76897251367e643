use thiserror::Error;
mod ops;
pub use self::ops::*;

use crate::data::DataError;
use crate::nn::NnError;
use crate::vision::VisionError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("无法将形状为{from:?}的张量重塑为{to:?}")]
    IncompatibleShape { from: Vec<usize>, to: Vec<usize> },
    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不一致")]
    InconsitentShape,
}

/// 训练程序的顶层错误：任何一个子模块的错误都会沿`?`传到`main`并终止进程
#[derive(Error, Debug)]
pub enum GanError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Nn(#[from] NnError),
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("配置解析失败: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("配置错误: {0}")]
    Config(String),
}
