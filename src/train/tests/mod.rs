mod checkpoint;
mod config;
mod session;

use std::path::Path;

use rand::Rng;

use crate::tensor::Tensor;
use crate::train::TrainingConfig;

/// 只跑几步的小配置，所有输出都写进`dir`
fn tiny_config(dir: &Path) -> TrainingConfig {
    TrainingConfig {
        batch_size: 3,
        epochs: 2,
        num_examples_to_generate: 4,
        checkpoint_every: 1,
        seed: Some(42),
        checkpoint_dir: dir.join("checkpoints"),
        image_dir: dir.join("images"),
        animation_file: dir.join("dcgan.gif"),
        ..TrainingConfig::default()
    }
}

/// [-1, 1] 区间内的随机“图像”
fn synthetic_images<R: Rng>(n: usize, rng: &mut R) -> Tensor {
    Tensor::uniform(-1.0, 1.0, &[n, 1, 28, 28], rng)
}
