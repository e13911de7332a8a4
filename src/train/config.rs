/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 训练配置与运行模式
 */

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::GanError;
use crate::vision::MAX_EPOCH;

/// 运行模式，在启动时确定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// 训练（存在检查点时从最近一个继续）
    Train,
    /// 从最近的检查点恢复并生成样本
    #[default]
    Infer,
}

impl RunMode {
    /// 由命令行位置参数决定：只有一个参数且恰好为`train`时训练，其余情况一律推理
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        match args {
            [only] if only.as_ref() == "train" => Self::Train,
            _ => Self::Infer,
        }
    }
}

/// 训练配置
///
/// 默认值即标准的 MNIST DCGAN 设置；每次训练开始时会以 JSON 形式写入检查点目录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub batch_size: usize,
    pub epochs: usize,
    pub latent_dim: usize,
    /// 每轮样本图中的图像数量（须为完全平方数）
    pub num_examples_to_generate: usize,
    /// 每隔多少轮保存一次检查点
    pub checkpoint_every: usize,
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    pub leaky_slope: f32,
    pub dropout_rate: f32,
    /// 随机种子，None 时使用系统熵
    pub seed: Option<u64>,
    /// 只使用训练集的前 n 张图像，None 时使用全部
    pub train_samples: Option<usize>,
    /// MNIST 数据目录，None 时使用默认缓存目录
    pub data_dir: Option<PathBuf>,
    pub checkpoint_dir: PathBuf,
    pub image_dir: PathBuf,
    pub animation_file: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: 256,
            epochs: 1500,
            latent_dim: 100,
            num_examples_to_generate: 16,
            checkpoint_every: 20,
            learning_rate: 1e-4,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            leaky_slope: 0.3,
            dropout_rate: 0.3,
            seed: None,
            train_samples: None,
            data_dir: None,
            checkpoint_dir: PathBuf::from("dcgan_training_checkpoints"),
            image_dir: PathBuf::from("images"),
            animation_file: PathBuf::from("dcgan.gif"),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), GanError> {
        let positive = [
            ("batch_size", self.batch_size),
            ("epochs", self.epochs),
            ("latent_dim", self.latent_dim),
            ("num_examples_to_generate", self.num_examples_to_generate),
            ("checkpoint_every", self.checkpoint_every),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(GanError::InvalidConfig(format!("{name} 必须大于 0")));
        }
        if self.epochs > MAX_EPOCH {
            return Err(GanError::InvalidConfig(format!(
                "epochs 不能超过 {MAX_EPOCH}，实际为 {}",
                self.epochs
            )));
        }

        let side = self.grid_side();
        if side * side != self.num_examples_to_generate {
            return Err(GanError::InvalidConfig(format!(
                "num_examples_to_generate 须为完全平方数，实际为 {}",
                self.num_examples_to_generate
            )));
        }

        let rates = [
            ("beta1", self.beta1),
            ("beta2", self.beta2),
            ("dropout_rate", self.dropout_rate),
        ];
        if let Some((name, value)) = rates.iter().find(|(_, v)| !(0.0..1.0).contains(v)) {
            return Err(GanError::InvalidConfig(format!(
                "{name} 须在 [0, 1) 区间内，实际为 {value}"
            )));
        }

        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(GanError::InvalidConfig(format!(
                "learning_rate 须为正数，实际为 {}",
                self.learning_rate
            )));
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(GanError::InvalidConfig(format!(
                "epsilon 须为正数，实际为 {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// 样本图每行（列）的图像数量
    pub fn grid_side(&self) -> usize {
        (self.num_examples_to_generate as f64).sqrt().round() as usize
    }
}
