use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{synthetic_images, tiny_config};
use crate::assert_err;
use crate::data::DataLoader;
use crate::tensor::Tensor;
use crate::train::{CheckpointError, CheckpointManager, TrainingSession};

#[test]
fn test_empty_directory_has_no_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let manager = CheckpointManager::new(dir.path().join("missing"));

    assert!(manager.latest_path().unwrap().is_none());
    assert!(manager.load_latest().unwrap().is_none());
    assert_err!(manager.require_latest(), CheckpointError::NotFound(_));
}

#[test]
fn test_checkpoint_round_trip_reproduces_eval_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = tiny_config(dir.path());
    let manager = CheckpointManager::new(&config.checkpoint_dir);
    let mut rng = StdRng::seed_from_u64(5);

    let mut session = TrainingSession::new(config.clone()).unwrap();
    let loader = DataLoader::new(synthetic_images(3, &mut rng), 3).unwrap();
    session.train_epoch(&loader).unwrap();

    let path = manager.save(&session.checkpoint()).unwrap();
    assert!(path.ends_with("ckpt-1.bin"));
    assert_eq!(manager.latest_path().unwrap(), Some(path));

    let restored = manager.require_latest().unwrap();
    assert_eq!(restored, session.checkpoint());
    assert_eq!(restored.epoch, 1);
    assert_eq!(restored.generator_optimizer.time_step(), 1);

    // 新会话（不同的初始权重）恢复后，推理结果与原会话完全一致
    let mut other = TrainingSession::new(crate::train::TrainingConfig {
        seed: Some(99),
        ..config
    })
    .unwrap();
    other.restore(restored).unwrap();
    let z = Tensor::normal(0.0, 1.0, &[2, 100], &mut rng);
    let expected = session.generator().generate(&z).unwrap();
    let actual = other.generator().generate(&z).unwrap();
    assert_eq!(actual, expected);
    let expected_scores = session.discriminator().decide(&expected).unwrap();
    let actual_scores = other.discriminator().decide(&actual).unwrap();
    assert_eq!(actual_scores, expected_scores);
    assert_eq!(other.epoch(), 1);
}

#[test]
fn test_checkpoint_names_increment_and_index_tracks_latest() {
    let dir = tempfile::tempdir().unwrap();
    let config = tiny_config(dir.path());
    let manager = CheckpointManager::new(&config.checkpoint_dir);
    let session = TrainingSession::new(config).unwrap();

    let first = manager.save(&session.checkpoint()).unwrap();
    let second = manager.save(&session.checkpoint()).unwrap();

    assert!(first.ends_with("ckpt-1.bin"));
    assert!(second.ends_with("ckpt-2.bin"));
    assert_eq!(manager.latest_path().unwrap(), Some(second));
    assert!(manager.dir().join("checkpoint").exists());

    let config_path = manager.save_config(session.config()).unwrap();
    let json = std::fs::read_to_string(config_path).unwrap();
    let saved: crate::train::TrainingConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(&saved, session.config());
}

#[test]
fn test_restore_rejects_incompatible_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let config = tiny_config(dir.path());
    let session = TrainingSession::new(config.clone()).unwrap();
    let mut wider = TrainingSession::new(crate::train::TrainingConfig {
        num_examples_to_generate: 9,
        ..config
    })
    .unwrap();

    assert_err!(
        wider.restore(session.checkpoint()),
        crate::errors::GanError::Checkpoint(CheckpointError::Incompatible(_))
    );
}
