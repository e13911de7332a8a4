/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : nn 模块的错误类型
 */

use thiserror::Error;

use crate::errors::TensorError;
use crate::tensor::Tensor;

/// 网络层、损失函数与优化器的错误类型
#[derive(Debug, Error, PartialEq)]
pub enum NnError {
    #[error("形状不匹配（{message}）: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("参数数量不匹配: 期望 {expected}, 实际 {got}")]
    ParameterCountMismatch { expected: usize, got: usize },
    #[error("无效操作: {0}")]
    InvalidOperation(String),
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

/// 检查张量形状是否与期望完全一致，不一致时返回`ShapeMismatch`
pub fn check_shape(tensor: &Tensor, expected: &[usize], message: &str) -> Result<(), NnError> {
    if tensor.shape() == expected {
        Ok(())
    } else {
        Err(NnError::ShapeMismatch {
            expected: expected.to_vec(),
            got: tensor.shape().to_vec(),
            message: message.to_string(),
        })
    }
}
