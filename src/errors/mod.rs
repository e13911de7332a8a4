/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 张量错误与整个程序的顶层错误。
 *                 各子模块（nn、data、train、vision）各自定义错误类型，
 *                 这里用`GanError`把它们汇总起来，供`app::run`和`main`使用。
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

use crate::data::DataError;
use crate::nn::NnError;
use crate::train::CheckpointError;
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
    #[error("数据长度{len}与形状{shape:?}不符")]
    DataShapeMismatch { len: usize, shape: Vec<usize> },
    #[error("无法将形状{from:?}重塑为{to:?}")]
    IncompatibleShape { from: Vec<usize>, to: Vec<usize> },
    #[error("期望{expected}维张量，实际为{got}维（形状{shape:?}）")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        shape: Vec<usize>,
    },
    #[error("张量列表为空")]
    EmptyList,
}

/// 程序顶层错误：任何一步失败都会沿`?`传到这里，然后终止运行
#[derive(Error, Debug)]
pub enum GanError {
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error(transparent)]
    Nn(#[from] NnError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error("配置无效: {0}")]
    InvalidConfig(String),
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}
