/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 对抗训练：配置、损失、单步梯度、检查点与训练会话
 */

mod checkpoint;
mod config;
mod loss;
mod session;
mod step;

#[cfg(test)]
mod tests;

pub use checkpoint::{Checkpoint, CheckpointError, CheckpointManager};
pub use config::{RunMode, TrainingConfig};
pub use loss::{DiscriminatorLoss, discriminator_loss, generator_loss};
pub use session::{EpochStats, TrainingSession};
pub use step::{StepStats, discriminator_gradients, generator_gradients};
