use rand::Rng;

use crate::tensor::Tensor;

/// 参数初始化方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// Xavier/Glorot 均匀分布：U(-limit, limit)，limit = sqrt(6 / (fan_in + fan_out))
    GlorotUniform { fan_in: usize, fan_out: usize },
}

impl Init {
    /// 生成初始化后的 Tensor
    pub fn generate<R: Rng + ?Sized>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        match *self {
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::GlorotUniform { fan_in, fan_out } => {
                let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
                Tensor::uniform(-limit, limit, shape, rng)
            }
        }
    }
}
