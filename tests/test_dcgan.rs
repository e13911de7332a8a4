/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : DCGAN 集成测试
 *                 用临时目录中的小型 IDX 文件代替真实 MNIST（不需要联网），
 *                 依次验证：训练 → 逐轮样本图 → 检查点 → 动图 → 断点续训 → 推理
 */

use std::path::Path;

use mnist_dcgan::app;
use mnist_dcgan::data::DataLoader;
use mnist_dcgan::errors::GanError;
use mnist_dcgan::model::{Discriminator, Generator};
use mnist_dcgan::nn::Mode;
use mnist_dcgan::tensor::Tensor;
use mnist_dcgan::train::{CheckpointError, CheckpointManager, RunMode, TrainingConfig, TrainingSession};
use mnist_dcgan::vision::{collect_epoch_images, epoch_image_path};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// 写一个含`n`张 28x28 图像的 IDX 文件（对角线条纹）
fn write_idx_images(dir: &Path, n: usize) {
    let mut bytes = Vec::new();
    for value in [2051u32, n as u32, 28, 28] {
        bytes.extend_from_slice(&value.to_be_bytes());
    }
    for i in 0..n {
        for y in 0..28 {
            for x in 0..28 {
                bytes.push(if (x + y + i) % 7 == 0 { 255 } else { 0 });
            }
        }
    }
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("train-images-idx3-ubyte"), bytes).unwrap();
}

fn config_in(root: &Path, epochs: usize) -> TrainingConfig {
    TrainingConfig {
        batch_size: 4,
        epochs,
        num_examples_to_generate: 4,
        checkpoint_every: 2,
        seed: Some(2026),
        train_samples: Some(6),
        data_dir: Some(root.join("mnist")),
        checkpoint_dir: root.join("checkpoints"),
        image_dir: root.join("images"),
        animation_file: root.join("dcgan.gif"),
        ..TrainingConfig::default()
    }
}

#[test]
fn test_train_resume_and_infer() {
    let dir = tempfile::tempdir().unwrap();
    write_idx_images(&dir.path().join("mnist"), 8);

    // 推理模式在没有检查点时报错
    let missing = app::run(RunMode::Infer, config_in(dir.path(), 2));
    assert!(matches!(
        missing,
        Err(GanError::Checkpoint(CheckpointError::NotFound(_)))
    ));

    // 训练 2 轮：第 0 轮（未训练）+ 第 1、2 轮样本图，第 2 轮检查点，动图
    let config = config_in(dir.path(), 2);
    app::run(RunMode::Train, config.clone()).unwrap();
    for epoch in 0..=2 {
        assert!(epoch_image_path(&config.image_dir, epoch).exists());
    }
    assert!(config.animation_file.exists());
    assert!(config.checkpoint_dir.join("config.json").exists());
    let manager = CheckpointManager::new(&config.checkpoint_dir);
    assert_eq!(manager.require_latest().unwrap().epoch, 2);

    // 续训到第 4 轮：不会重新生成第 0 轮样本图，检查点编号递增
    app::run(RunMode::Train, config_in(dir.path(), 4)).unwrap();
    assert_eq!(collect_epoch_images(&config.image_dir).unwrap().len(), 5);
    let latest = manager.require_latest().unwrap();
    assert_eq!(latest.epoch, 4);
    assert!(config.checkpoint_dir.join("ckpt-2.bin").exists());
    // 8 张图只取 6 张，批大小 4：每轮 2 步，共 8 步
    assert_eq!(latest.generator_optimizer.time_step(), 8);

    // 推理：生成 image_inference.png，且不进入动图的帧集合
    app::run(RunMode::Infer, config_in(dir.path(), 4)).unwrap();
    assert!(config.image_dir.join(app::INFERENCE_IMAGE).exists());
    assert_eq!(collect_epoch_images(&config.image_dir).unwrap().len(), 5);
}

#[test]
fn test_zero_inputs_give_finite_outputs() {
    let mut rng = StdRng::seed_from_u64(0);
    let generator = Generator::new(100, 0.3, &mut rng);
    let discriminator = Discriminator::new(0.3, 0.3, &mut rng).unwrap();

    for mode in [Mode::Train, Mode::Eval] {
        let (images, _) = generator.forward(&Tensor::zeros(&[2, 100]), mode).unwrap();
        assert_eq!(images.shape(), &[2, 1, 28, 28]);
        assert!(images.is_finite());

        let (logits, _) = discriminator
            .forward(&Tensor::zeros(&[2, 1, 28, 28]), mode, &mut rng)
            .unwrap();
        assert_eq!(logits.shape(), &[2, 1]);
        assert!(logits.is_finite());
    }
}

#[test]
fn test_training_session_on_synthetic_images() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig {
        epochs: 1,
        ..config_in(dir.path(), 1)
    };
    let mut rng = StdRng::seed_from_u64(1);
    let images = Tensor::uniform(-1.0, 1.0, &[5, 1, 28, 28], &mut rng);
    let loader = DataLoader::new(images, config.batch_size).unwrap().shuffle(true);
    let manager = CheckpointManager::new(&config.checkpoint_dir);

    let mut session = TrainingSession::new(config.clone()).unwrap();
    let history = session.train(&loader, &manager).unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].batches, 2);
    assert!(history[0].generator_loss.is_finite());
    // checkpoint_every = 2，一轮后还没有检查点
    assert!(manager.latest_path().unwrap().is_none());

    let samples = session.generator().generate(session.sample_seed()).unwrap();
    assert_eq!(samples.shape(), &[4, 1, 28, 28]);
    assert!(samples.max_abs() <= 1.0);
}
