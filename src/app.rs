/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 程序入口逻辑：按运行模式组装数据、训练会话、检查点与可视化
 */

use tracing::info;

use crate::data::{DataLoader, MnistDataset};
use crate::errors::GanError;
use crate::train::{CheckpointManager, RunMode, TrainingConfig, TrainingSession};
use crate::vision::{epoch_image_path, write_animation};

/// 推理模式的样本图文件名（不参与动图合成）
pub const INFERENCE_IMAGE: &str = "image_inference.png";

/// 按运行模式执行一次完整流程
pub fn run(mode: RunMode, config: TrainingConfig) -> Result<(), GanError> {
    match mode {
        RunMode::Train => train(config),
        RunMode::Infer => infer(config),
    }
}

/// 训练：存在检查点时从最近一个继续，否则先做一次未训练检查并保存第 0 轮样本图
fn train(config: TrainingConfig) -> Result<(), GanError> {
    let mut session = TrainingSession::new(config)?;
    let config = session.config().clone();
    let checkpoints = CheckpointManager::new(&config.checkpoint_dir);

    let mut dataset = MnistDataset::load(config.data_dir.as_deref(), true)?;
    if let Some(n) = config.train_samples {
        dataset = dataset.take(n);
    }
    let loader = DataLoader::new(dataset.into_images(), config.batch_size)?.shuffle(true);

    match checkpoints.load_latest()? {
        Some(checkpoint) => session.restore(checkpoint)?,
        None => {
            session.sanity_check()?;
            session.save_sample_grid(&epoch_image_path(&config.image_dir, 0))?;
        }
    }
    checkpoints.save_config(&config)?;

    info!(
        "开始训练：第 {} 轮起，共 {} 轮，每轮 {} 个批次",
        session.epoch() + 1,
        config.epochs,
        loader.num_batches()
    );
    session.train(&loader, &checkpoints)?;

    write_animation(&config.image_dir, &config.animation_file)?;
    Ok(())
}

/// 推理：恢复最近的检查点，打分一张生成图像，再用新种子保存一张样本图
fn infer(config: TrainingConfig) -> Result<(), GanError> {
    let mut session = TrainingSession::new(config)?;
    let checkpoints = CheckpointManager::new(&session.config().checkpoint_dir);
    session.restore(checkpoints.require_latest()?)?;

    session.sanity_check()?;
    session.resample_seed();
    let path = session.config().image_dir.join(INFERENCE_IMAGE);
    session.save_sample_grid(&path)?;
    info!("样本图已保存到 {}", path.display());
    Ok(())
}

