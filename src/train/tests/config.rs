use crate::assert_err;
use crate::errors::GanError;
use crate::train::{RunMode, TrainingConfig};

#[test]
fn test_default_config_matches_training_constants() {
    let config = TrainingConfig::default();

    assert_eq!(config.batch_size, 256);
    assert_eq!(config.epochs, 1500);
    assert_eq!(config.latent_dim, 100);
    assert_eq!(config.num_examples_to_generate, 16);
    assert_eq!(config.checkpoint_every, 20);
    assert_eq!(config.grid_side(), 4);
    assert!(config.validate().is_ok());
    assert_eq!(RunMode::default(), RunMode::Infer);
}

#[test]
fn test_config_validation_rejects_bad_values() {
    let cases = [
        TrainingConfig {
            batch_size: 0,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            epochs: 0,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            epochs: 10_000,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            latent_dim: 0,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            checkpoint_every: 0,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            num_examples_to_generate: 15,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            dropout_rate: 1.0,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            beta2: -0.1,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            learning_rate: 0.0,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            epsilon: f32::NAN,
            ..TrainingConfig::default()
        },
    ];

    for config in cases {
        assert_err!(config.validate(), GanError::InvalidConfig(_));
    }
}

#[test]
fn test_config_accepts_four_digit_epoch_limit() {
    let config = TrainingConfig {
        epochs: 9999,
        ..TrainingConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_run_mode_from_args() {
    assert_eq!(RunMode::from_args(&["train"]), RunMode::Train);
    assert_eq!(RunMode::from_args::<&str>(&[]), RunMode::Infer);
    assert_eq!(RunMode::from_args(&["infer"]), RunMode::Infer);
    // 只有恰好一个 train 参数才训练
    assert_eq!(RunMode::from_args(&["Train"]), RunMode::Infer);
    assert_eq!(RunMode::from_args(&["training"]), RunMode::Infer);
    assert_eq!(RunMode::from_args(&[""]), RunMode::Infer);
    assert_eq!(RunMode::from_args(&["train", "extra"]), RunMode::Infer);
    assert_eq!(RunMode::from_args(&["train".to_string()]), RunMode::Train);
}

#[test]
fn test_config_json_fills_missing_fields_with_defaults() {
    let config: TrainingConfig = serde_json::from_str(r#"{"epochs": 3, "seed": 9}"#).unwrap();

    assert_eq!(config.epochs, 3);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.batch_size, 256);

    let json = serde_json::to_string(&config).unwrap();
    let restored: TrainingConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}
