/*
 * @Description  : nn 模块的错误类型
 */

use crate::errors::TensorError;
use thiserror::Error;

/// 网络构建、前向/反向传播以及优化器相关的错误
#[derive(Error, Debug, PartialEq)]
pub enum NnError {
    #[error("{message}：期望形状{expected:?}，实际形状{got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("无效操作：{0}")]
    InvalidOperation(String),
    #[error("层{0}尚未执行前向传播，无法反向传播")]
    BackwardBeforeForward(String),
    #[error("梯度缓冲区尚未准备好：请先调用zero_grad()")]
    GradientsNotPrepared,
    #[error("参数个数不匹配：期望{expected}个，实际{got}个")]
    ParameterCountMismatch { expected: usize, got: usize },
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
