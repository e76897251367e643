/*
 * @Description  : DCGAN 对抗训练
 *
 * 每个批次：
 * 1. 判别器：D(real) 对全1、D(G(z)) 对全0 求 BCE，梯度只进入 D 的缓冲区
 *    （fake 对 D 而言是常量输入，其输入梯度被丢弃，G 的参数不受影响），更新 D；
 * 2. 生成器：复用同一批 fake，经更新后的 D 对全1求 BCE，
 *    梯度穿过 D（D 的参数梯度写入临时缓冲区后丢弃）进入 G 的缓冲区，更新 G；
 * 3. 打印一行损失；每隔`sample_interval`个批次导出真实样本与新生成样本的网格图。
 */

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use super::config::TrainConfig;
use super::model::{Discriminator, Generator, LATENT_DIM};
use crate::context::Context;
use crate::data::{DataLoader, Dataset};
use crate::errors::GanError;
use crate::nn::{Adam, BCELoss, GradBuffer, Module, NnError, Optimizer};
use crate::tensor::Tensor;
use crate::vision::{GridOptions, Vision};

/// 真实样本网格图的文件名（每次导出都覆盖）
pub const REAL_SAMPLES_FILE: &str = "real_samples.png";

/// 生成样本网格图的文件名
pub fn fake_samples_file(epoch: usize) -> String {
    format!("fake_samples_epoch_{epoch:03}.png")
}

/// 单个批次的训练结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub epoch: usize,
    pub epochs: usize,
    pub batch: usize,
    pub num_batches: usize,
    pub loss_d: f32,
    pub loss_g: f32,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}][{}/{}] Loss_D: {:.4} Loss_G: {:.4}",
            self.epoch, self.epochs, self.batch, self.num_batches, self.loss_d, self.loss_g
        )
    }
}

pub struct Trainer {
    config: TrainConfig,
    ctx: Context,
    generator: Generator,
    discriminator: Discriminator,
    optimizer_g: Adam,
    optimizer_d: Adam,
    criterion: BCELoss,
    grid_options: GridOptions,
}

impl Trainer {
    /// 按配置构建两个网络（已初始化）及各自独立的 Adam 优化器
    pub fn new(config: TrainConfig) -> Self {
        let mut ctx = config.seed.map_or_else(Context::new, Context::with_seed);
        let generator = Generator::new(&mut ctx);
        let discriminator = Discriminator::new(&mut ctx);
        let (lr, beta1, beta2, eps) = (
            config.learning_rate,
            config.beta1,
            config.beta2,
            config.epsilon,
        );
        let optimizer_g = Adam::new(&generator, lr, beta1, beta2, eps);
        let optimizer_d = Adam::new(&discriminator, lr, beta1, beta2, eps);
        info!(
            "生成器参数 {} 个，判别器参数 {} 个",
            generator.num_elements(),
            discriminator.num_elements()
        );

        Self {
            config,
            ctx,
            generator,
            discriminator,
            optimizer_g,
            optimizer_d,
            criterion: BCELoss::new(),
            grid_options: GridOptions::default(),
        }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    /// 采样一批潜向量 [batch, 100, 1, 1]
    fn sample_noise(&mut self, batch: usize) -> Tensor {
        self.ctx.randn(&[batch, LATENT_DIM, 1, 1])
    }

    /// 判别器的一次更新，返回 (D 的损失, 本次生成的 fake 批次)
    pub fn discriminator_step(&mut self, real: &Tensor) -> Result<(f32, Tensor), NnError> {
        let batch = real.shape().first().copied().unwrap_or(0);
        let real_labels = Tensor::ones(&[batch]);
        let fake_labels = Tensor::zeros(&[batch]);

        self.optimizer_d.zero_grad();

        // 真实样本
        let output = self.discriminator.forward(&self.ctx, real)?;
        let loss_real = self.criterion.forward(&output, &real_labels)?;
        self.discriminator
            .backward(&loss_real.grad, self.optimizer_d.grads_mut()?)?;

        // 生成样本：对 D 而言是常量，输入梯度丢弃
        let noise = self.sample_noise(batch);
        let fake = self.generator.forward(&self.ctx, &noise)?;
        let output = self.discriminator.forward(&self.ctx, &fake)?;
        let loss_fake = self.criterion.forward(&output, &fake_labels)?;
        self.discriminator
            .backward(&loss_fake.grad, self.optimizer_d.grads_mut()?)?;

        self.optimizer_d.step(&mut self.discriminator)?;
        Ok((loss_real.value + loss_fake.value, fake))
    }

    /// 生成器的一次更新：`fake`必须是生成器最近一次前向的输出
    pub fn generator_step(&mut self, fake: &Tensor) -> Result<f32, NnError> {
        let batch = fake.shape().first().copied().unwrap_or(0);
        let real_labels = Tensor::ones(&[batch]);

        self.optimizer_g.zero_grad();

        let output = self.discriminator.forward(&self.ctx, fake)?;
        let loss = self.criterion.forward(&output, &real_labels)?;
        let mut scratch = GradBuffer::for_module(&self.discriminator);
        let grad_fake = self.discriminator.backward(&loss.grad, &mut scratch)?;
        self.generator
            .backward(&grad_fake, self.optimizer_g.grads_mut()?)?;

        self.optimizer_g.step(&mut self.generator)?;
        Ok(loss.value)
    }

    /// 一个批次的完整训练，返回 (D 的损失, G 的损失)
    pub fn train_step(&mut self, real: &Tensor) -> Result<(f32, f32), NnError> {
        let (loss_d, fake) = self.discriminator_step(real)?;
        let loss_g = self.generator_step(&fake)?;
        Ok((loss_d, loss_g))
    }

    /// 第`batch`个批次（从0开始）是否导出样本图：每隔`sample_interval`个批次一次，含第0个
    pub fn should_export(&self, batch: usize) -> bool {
        let interval = self.config.sample_interval;
        interval > 0 && batch % interval == 0
    }

    /// 导出真实样本与新生成样本（新采样的噪声）的网格图
    pub fn export_samples(&mut self, epoch: usize, real: &Tensor) -> Result<(), GanError> {
        let dir = PathBuf::from(&self.config.results_dir);
        Vision::save_image_grid(real, &dir.join(REAL_SAMPLES_FILE), &self.grid_options)?;

        let batch = real.shape().first().copied().unwrap_or(0);
        let noise = self.sample_noise(batch);
        let fake = self.generator.forward(&self.ctx, &noise)?;
        let fake_path = dir.join(fake_samples_file(epoch));
        Vision::save_image_grid(&fake, &fake_path, &self.grid_options)?;
        debug!("已导出样本图: {fake_path:?}");
        Ok(())
    }

    /// 训练一个 epoch，每个批次打印一行报告
    pub fn train_epoch<D: Dataset>(
        &mut self,
        epoch: usize,
        loader: &DataLoader<D>,
    ) -> Result<Vec<StepReport>, GanError> {
        let num_batches = loader.num_batches();
        let mut reports = Vec::with_capacity(num_batches);

        for (batch, item) in loader.iter().enumerate() {
            let (real, _labels) = item?;
            let (loss_d, loss_g) = self.train_step(&real)?;

            let report = StepReport {
                epoch,
                epochs: self.config.epochs,
                batch,
                num_batches,
                loss_d,
                loss_g,
            };
            println!("{report}");

            if self.should_export(batch) {
                self.export_samples(epoch, &real)?;
            }
            reports.push(report);
        }
        Ok(reports)
    }

    /// 训练`config.epochs`个 epoch
    pub fn fit<D: Dataset>(&mut self, loader: &DataLoader<D>) -> Result<Vec<StepReport>, GanError> {
        info!(
            "开始训练：{} 个 epoch，每个 epoch {} 个批次（批大小 {}）",
            self.config.epochs,
            loader.num_batches(),
            loader.batch_size()
        );
        let mut reports = Vec::new();
        for epoch in 0..self.config.epochs {
            let epoch_reports = self.train_epoch(epoch, loader)?;
            if let Some(last) = epoch_reports.last() {
                info!("epoch {epoch} 完成：{last}");
            }
            reports.extend(epoch_reports);
        }
        Ok(reports)
    }
}
