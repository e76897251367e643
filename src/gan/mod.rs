/*
 * @Description  : DCGAN：网络结构、训练配置与对抗训练循环
 */

mod config;
mod model;
mod trainer;

pub use config::TrainConfig;
pub use model::{Discriminator, Generator, IMAGE_CHANNELS, IMAGE_SIZE, LATENT_DIM};
pub use trainer::{REAL_SAMPLES_FILE, StepReport, Trainer, fake_samples_file};

#[cfg(test)]
mod tests;
