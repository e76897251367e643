/*
 * @Description  : 对抗训练步骤测试（detach、参数隔离、报告格式）
 */

use crate::gan::{StepReport, TrainConfig, Trainer, fake_samples_file};
use crate::nn::Module;
use crate::tensor::Tensor;

fn snapshot(module: &dyn Module) -> Vec<Tensor> {
    module.parameters().into_iter().cloned().collect()
}

fn real_batch(trainer_seed: u64, batch: usize) -> Tensor {
    let mut ctx = crate::context::Context::with_seed(trainer_seed);
    ctx.randn(&[batch, 3, 64, 64]).map(f32::tanh)
}

#[test]
fn test_discriminator_step_leaves_generator_untouched() {
    let mut trainer = Trainer::new(TrainConfig::default().seed(1));
    let g_before = snapshot(trainer.generator());
    let d_before = snapshot(trainer.discriminator());

    let (loss_d, fake) = trainer.discriminator_step(&real_batch(9, 2)).unwrap();
    assert!(loss_d.is_finite() && loss_d > 0.0);
    assert_eq!(fake.shape(), &[2, 3, 64, 64]);

    // G 的参数逐位不变，D 的参数已更新
    assert_eq!(snapshot(trainer.generator()), g_before);
    assert_ne!(snapshot(trainer.discriminator()), d_before);
}

#[test]
fn test_generator_step_leaves_discriminator_untouched() {
    let mut trainer = Trainer::new(TrainConfig::default().seed(2));
    let (_, fake) = trainer.discriminator_step(&real_batch(8, 2)).unwrap();

    let g_before = snapshot(trainer.generator());
    let d_before = snapshot(trainer.discriminator());
    let loss_g = trainer.generator_step(&fake).unwrap();
    assert!(loss_g.is_finite() && loss_g > 0.0);

    assert_ne!(snapshot(trainer.generator()), g_before);
    assert_eq!(snapshot(trainer.discriminator()), d_before);
}

#[test]
fn test_train_step_is_reproducible_with_seed() {
    let run = || {
        let mut trainer = Trainer::new(TrainConfig::default().seed(5));
        trainer.train_step(&real_batch(3, 2)).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_step_report_format() {
    let report = StepReport {
        epoch: 3,
        epochs: 25,
        batch: 100,
        num_batches: 1137,
        loss_d: 0.51234,
        loss_g: 2.0,
    };
    assert_eq!(
        report.to_string(),
        "[3/25][100/1137] Loss_D: 0.5123 Loss_G: 2.0000"
    );
}

#[test]
fn test_fake_samples_file_name() {
    assert_eq!(fake_samples_file(0), "fake_samples_epoch_000.png");
    assert_eq!(fake_samples_file(24), "fake_samples_epoch_024.png");
}

#[test]
fn test_export_cadence() {
    let trainer = Trainer::new(TrainConfig::default().seed(0).sample_interval(2));
    let exported: Vec<usize> = (0..7).filter(|&b| trainer.should_export(b)).collect();
    assert_eq!(exported, vec![0, 2, 4, 6]);

    // 默认每 100 个批次一次，含第 0 个
    let trainer = Trainer::new(TrainConfig::default().seed(0));
    assert!(trainer.should_export(0));
    assert!(!trainer.should_export(1));
    assert!(!trainer.should_export(99));
    assert!(trainer.should_export(100));

    // 0 表示不导出
    let trainer = Trainer::new(TrainConfig::default().seed(0).sample_interval(0));
    assert!((0..5).all(|b| !trainer.should_export(b)));
}
