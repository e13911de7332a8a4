/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 训练会话测试：单步、整轮、完整训练循环
 */

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{synthetic_images, tiny_config};
use crate::assert_err;
use crate::data::DataLoader;
use crate::errors::GanError;
use crate::nn::NnError;
use crate::tensor::Tensor;
use crate::train::{CheckpointManager, TrainingSession};
use crate::vision::epoch_image_path;

#[test]
fn test_train_step_updates_both_networks() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = TrainingSession::new(tiny_config(dir.path())).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let generator_before = session.generator().clone();
    let discriminator_before = session.discriminator().clone();

    let stats = session.train_step(&synthetic_images(2, &mut rng)).unwrap();

    assert!(stats.generator_loss >= 0.0);
    assert!(stats.discriminator_loss.total >= 0.0);
    assert!(stats.real_score.is_finite() && stats.fake_score.is_finite());
    assert_ne!(session.generator(), &generator_before);
    assert_ne!(session.discriminator(), &discriminator_before);
    assert_eq!(session.generator_optimizer().time_step(), 1);
    assert_eq!(session.discriminator_optimizer().time_step(), 1);
    // 单步不计为一轮
    assert_eq!(session.epoch(), 0);
}

#[test]
fn test_train_step_rejects_bad_batches() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = TrainingSession::new(tiny_config(dir.path())).unwrap();

    assert_err!(
        session.train_step(&Tensor::zeros(&[2, 1, 32, 32])),
        GanError::Nn(NnError::ShapeMismatch { .. })
    );
    assert_err!(
        session.train_step(&Tensor::zeros(&[0, 1, 28, 28])),
        GanError::Nn(NnError::InvalidOperation(_))
    );
}

#[test]
fn test_train_epoch_keeps_partial_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = TrainingSession::new(tiny_config(dir.path())).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    // 5 张图、批大小 3：两个批次（3 + 2）
    let loader = DataLoader::new(synthetic_images(5, &mut rng), 3).unwrap().shuffle(true);

    let stats = session.train_epoch(&loader).unwrap();

    assert_eq!(stats.epoch, 1);
    assert_eq!(stats.batches, 2);
    assert_eq!(session.generator_optimizer().time_step(), 2);
    assert!(stats.generator_loss.is_finite() && stats.discriminator_loss.is_finite());
}

#[test]
fn test_train_writes_grids_and_checkpoints_then_stops() {
    let dir = tempfile::tempdir().unwrap();
    let config = tiny_config(dir.path());
    let manager = CheckpointManager::new(&config.checkpoint_dir);
    let mut session = TrainingSession::new(config.clone()).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let loader = DataLoader::new(synthetic_images(3, &mut rng), 3).unwrap();
    let seed_before = session.sample_seed().clone();

    let history = session.train(&loader, &manager).unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(session.epoch(), 2);
    assert!(epoch_image_path(&config.image_dir, 1).exists());
    assert!(epoch_image_path(&config.image_dir, 2).exists());
    assert!(manager.dir().join("ckpt-2.bin").exists());
    assert_eq!(manager.require_latest().unwrap().epoch, 2);
    // 固定种子在训练中不变
    assert_eq!(session.sample_seed(), &seed_before);

    // 已达到目标轮数，再次调用不会继续训练
    assert!(session.train(&loader, &manager).unwrap().is_empty());
}

#[test]
fn test_sanity_check_and_resample_seed() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = TrainingSession::new(tiny_config(dir.path())).unwrap();

    let (image, decision) = session.sanity_check().unwrap();
    assert_eq!(image.shape(), &[1, 1, 28, 28]);
    assert!(decision.is_finite());

    let before = session.sample_seed().clone();
    session.resample_seed();
    assert_eq!(session.sample_seed().shape(), before.shape());
    assert_ne!(session.sample_seed(), &before);
}

#[test]
fn test_same_seed_gives_same_initial_state() {
    let dir = tempfile::tempdir().unwrap();
    let a = TrainingSession::new(tiny_config(dir.path())).unwrap();
    let b = TrainingSession::new(tiny_config(dir.path())).unwrap();

    assert_eq!(a.checkpoint(), b.checkpoint());
}
