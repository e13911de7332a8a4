/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 训练会话：持有两个网络、两个优化器、配置、固定种子与随机源，
 *                 负责单步训练、整轮训练、逐轮样本图与检查点。
 */

use std::path::Path;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use super::checkpoint::{Checkpoint, CheckpointError, CheckpointManager};
use super::step::{StepStats, discriminator_gradients, generator_gradients};
use super::TrainingConfig;
use crate::data::DataLoader;
use crate::errors::GanError;
use crate::model::{Discriminator, Generator, image_batch_shape};
use crate::nn::{Adam, Mode, Module, NnError, Optimizer, check_shape};
use crate::tensor::Tensor;
use crate::vision::{Vision, epoch_image_path};

/// 一轮训练的平均统计量
#[derive(Debug, Clone, PartialEq)]
pub struct EpochStats {
    /// 轮数（从 1 开始）
    pub epoch: usize,
    pub batches: usize,
    pub generator_loss: f32,
    pub discriminator_loss: f32,
    /// 真实样本 logits 的平均值
    pub real_score: f32,
    /// 生成样本 logits 的平均值
    pub fake_score: f32,
    pub elapsed: Duration,
}

pub struct TrainingSession {
    config: TrainingConfig,
    generator: Generator,
    discriminator: Discriminator,
    generator_optimizer: Adam,
    discriminator_optimizer: Adam,
    /// 逐轮样本图使用的固定隐向量，整个训练过程不变
    sample_seed: Tensor,
    rng: StdRng,
    /// 已完成的轮数
    epoch: usize,
}

impl TrainingSession {
    /// 按配置初始化网络与优化器；配置无效时报错
    pub fn new(config: TrainingConfig) -> Result<Self, GanError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let generator = Generator::new(config.latent_dim, config.leaky_slope, &mut rng);
        let discriminator = Discriminator::new(config.leaky_slope, config.dropout_rate, &mut rng)?;
        let generator_optimizer =
            Adam::new(config.learning_rate, config.beta1, config.beta2, config.epsilon);
        let discriminator_optimizer = generator_optimizer.clone();
        let sample_seed = Tensor::normal(
            0.0,
            1.0,
            &[config.num_examples_to_generate, config.latent_dim],
            &mut rng,
        );

        info!(
            "生成器参数量: {}，判别器参数量: {}",
            generator.num_params(),
            discriminator.num_params()
        );

        Ok(Self {
            config,
            generator,
            discriminator,
            generator_optimizer,
            discriminator_optimizer,
            sample_seed,
            rng,
            epoch: 0,
        })
    }

    /// 在一个真实批次上训练一步
    ///
    /// 先用更新前的两个网络算出两组梯度，再分别交给各自的 Adam，
    /// 最后把生成器本步的批统计量并入滑动统计。
    pub fn train_step(&mut self, images: &Tensor) -> Result<StepStats, GanError> {
        let n = images.batch_size();
        check_shape(images, &image_batch_shape(n), "真实批次")?;
        if n == 0 {
            return Err(NnError::InvalidOperation("训练批次不能为空".to_string()).into());
        }

        let noise = Tensor::normal(0.0, 1.0, &[n, self.config.latent_dim], &mut self.rng);
        let (fake, generator_tape) = self.generator.forward(&noise, Mode::Train)?;
        let (real_logits, real_tape) =
            self.discriminator.forward(images, Mode::Train, &mut self.rng)?;
        let (fake_logits, fake_tape) =
            self.discriminator.forward(&fake, Mode::Train, &mut self.rng)?;

        let (generator_loss, generator_grads) = generator_gradients(
            &self.generator,
            &self.discriminator,
            &generator_tape,
            &fake_tape,
            &fake_logits,
        )?;
        let (discriminator_loss, discriminator_grads) = discriminator_gradients(
            &self.discriminator,
            &real_tape,
            &real_logits,
            &fake_tape,
            &fake_logits,
        )?;

        self.generator_optimizer
            .step(self.generator.parameters_mut(), &generator_grads)?;
        self.discriminator_optimizer
            .step(self.discriminator.parameters_mut(), &discriminator_grads)?;
        self.generator.update_moving_stats(&generator_tape)?;

        Ok(StepStats {
            generator_loss,
            discriminator_loss,
            real_score: real_logits.mean(),
            fake_score: fake_logits.mean(),
        })
    }

    /// 训练一轮：重新打乱数据，依次训练每个批次
    pub fn train_epoch(&mut self, loader: &DataLoader) -> Result<EpochStats, GanError> {
        let start = Instant::now();
        let mut batches = 0usize;
        let mut sums = [0.0f64; 4];

        for batch in loader.iter(&mut self.rng) {
            let step = self.train_step(&batch)?;
            batches += 1;
            sums[0] += f64::from(step.generator_loss);
            sums[1] += f64::from(step.discriminator_loss.total);
            sums[2] += f64::from(step.real_score);
            sums[3] += f64::from(step.fake_score);
        }
        if batches == 0 {
            return Err(GanError::InvalidConfig("数据集为空".to_string()));
        }

        self.epoch += 1;
        let mean = |sum: f64| (sum / batches as f64) as f32;
        let stats = EpochStats {
            epoch: self.epoch,
            batches,
            generator_loss: mean(sums[0]),
            discriminator_loss: mean(sums[1]),
            real_score: mean(sums[2]),
            fake_score: mean(sums[3]),
            elapsed: start.elapsed(),
        };
        info!(
            "第 {}/{} 轮: G 损失 {:.4}，D 损失 {:.4}，D(real) {:.3}，D(fake) {:.3}，用时 {:.1}s",
            stats.epoch,
            self.config.epochs,
            stats.generator_loss,
            stats.discriminator_loss,
            stats.real_score,
            stats.fake_score,
            stats.elapsed.as_secs_f64()
        );
        Ok(stats)
    }

    /// 从当前轮数训练到`config.epochs`
    ///
    /// 每轮结束保存样本图，每`checkpoint_every`轮保存一次检查点。
    pub fn train(
        &mut self,
        loader: &DataLoader,
        checkpoints: &CheckpointManager,
    ) -> Result<Vec<EpochStats>, GanError> {
        let mut history = Vec::new();
        while self.epoch < self.config.epochs {
            let stats = self.train_epoch(loader)?;
            self.save_sample_grid(&epoch_image_path(&self.config.image_dir, self.epoch))?;
            if self.epoch % self.config.checkpoint_every == 0 {
                checkpoints.save(&self.checkpoint())?;
            }
            history.push(stats);
        }
        Ok(history)
    }

    /// 用固定种子生成样本并拼成网格图保存
    pub fn save_sample_grid(&self, path: &Path) -> Result<(), GanError> {
        let images = self.generator.generate(&self.sample_seed)?;
        Vision::save_image_grid(&images, self.config.grid_side(), path)?;
        Ok(())
    }

    /// 生成一张图像并让判别器打分，返回 (图像 [1, 1, 28, 28], logit)
    pub fn sanity_check(&mut self) -> Result<(Tensor, f32), GanError> {
        let noise = Tensor::normal(0.0, 1.0, &[1, self.config.latent_dim], &mut self.rng);
        let image = self.generator.generate(&noise)?;
        let decision = self.discriminator.decide(&image)?.sum();
        info!("判别器对生成图像的判定 logit: {decision:.6}");
        Ok((image, decision))
    }

    /// 重新抽取样本图的固定种子
    pub fn resample_seed(&mut self) {
        self.sample_seed = Tensor::normal(0.0, 1.0, self.sample_seed.shape(), &mut self.rng);
    }

    /// 当前训练状态的快照
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            epoch: self.epoch,
            generator: self.generator.clone(),
            discriminator: self.discriminator.clone(),
            generator_optimizer: self.generator_optimizer.clone(),
            discriminator_optimizer: self.discriminator_optimizer.clone(),
            sample_seed: self.sample_seed.clone(),
        }
    }

    /// 用检查点替换当前状态，之后从`checkpoint.epoch + 1`轮继续
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), GanError> {
        let expected_seed = [self.config.num_examples_to_generate, self.config.latent_dim];
        if checkpoint.generator.latent_dim() != self.config.latent_dim {
            return Err(CheckpointError::Incompatible(format!(
                "隐向量维数为 {}，配置为 {}",
                checkpoint.generator.latent_dim(),
                self.config.latent_dim
            ))
            .into());
        }
        if checkpoint.sample_seed.shape() != expected_seed {
            return Err(CheckpointError::Incompatible(format!(
                "固定种子形状为 {:?}，配置要求 {expected_seed:?}",
                checkpoint.sample_seed.shape()
            ))
            .into());
        }

        self.epoch = checkpoint.epoch;
        self.generator = checkpoint.generator;
        self.discriminator = checkpoint.discriminator;
        self.generator_optimizer = checkpoint.generator_optimizer;
        self.discriminator_optimizer = checkpoint.discriminator_optimizer;
        self.sample_seed = checkpoint.sample_seed;
        info!("已从第 {} 轮的检查点恢复", self.epoch);
        Ok(())
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    pub fn generator_optimizer(&self) -> &Adam {
        &self.generator_optimizer
    }

    pub fn discriminator_optimizer(&self) -> &Adam {
        &self.discriminator_optimizer
    }

    pub fn sample_seed(&self) -> &Tensor {
        &self.sample_seed
    }

    /// 已完成的轮数
    pub fn epoch(&self) -> usize {
        self.epoch
    }
}
