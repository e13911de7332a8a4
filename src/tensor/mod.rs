/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 张量：对`ndarray`动态维数组的一层薄封装。
 *                 网络中的图像统一采用 Batch-First 的 NCHW 格式，即[batch, C, H, W]。
 */

use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};
use serde::{Deserialize, Serialize};

use crate::errors::TensorError;

mod ops {
    pub mod arithmetic;
    pub mod others;
}
mod property;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通过Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量，`data`的长度必须和`shape`中所有元素的乘积相等。
    ///
    /// # Panics
    /// 长度与形状不符时panic；需要错误返回值时请用[`Tensor::from_vec`]
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        match Self::from_vec(data.to_vec(), shape) {
            Ok(tensor) => tensor,
            Err(e) => panic!("{e}"),
        }
    }

    /// 由已有的数据创建张量（不拷贝）
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Result<Self, TensorError> {
        let len = data.len();
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(|data| Self { data })
            .map_err(|_| TensorError::DataShapeMismatch {
                len,
                shape: shape.to_vec(),
            })
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::ones(IxDyn(shape)),
        }
    }

    /// 所有元素都为`value`的张量
    pub fn full(shape: &[usize], value: f32) -> Self {
        Self {
            data: ArrayD::from_elem(IxDyn(shape), value),
        }
    }

    /// 与`other`形状相同的全零张量
    pub fn zeros_like(other: &Self) -> Self {
        Self::zeros(other.shape())
    }

    /// 创建一个服从正态分布N(mean, std_dev²)的随机张量。
    /// 随机源由调用方传入，以便训练过程可用种子复现。
    pub fn normal<R: Rng + ?Sized>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Self {
        let data = ArrayD::from_shape_simple_fn(IxDyn(shape), || {
            let z: f32 = StandardNormal.sample(rng);
            mean + std_dev * z
        });
        Self { data }
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间
    pub fn uniform<R: Rng + ?Sized>(min: f32, max: f32, shape: &[usize], rng: &mut R) -> Self {
        let dist = Uniform::new_inclusive(min, max);
        let data = ArrayD::from_shape_simple_fn(IxDyn(shape), || dist.sample(rng));
        Self { data }
    }
}
