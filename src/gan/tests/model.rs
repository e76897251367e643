/*
 * @Description  : 生成器、判别器的形状、值域与初始化测试
 */

use crate::context::{Context, Mode};
use crate::gan::{Discriminator, Generator, IMAGE_SIZE, LATENT_DIM};
use crate::nn::{GradBuffer, Init, Module, NnError, WeightInit};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_generator_output_shape_and_range() {
    let mut ctx = Context::with_seed(42);
    let mut generator = Generator::new(&mut ctx);
    for batch in [1, 2] {
        let noise = ctx.randn(&[batch, LATENT_DIM, 1, 1]);
        let fake = generator.forward(&ctx, &noise).unwrap();
        assert_eq!(fake.shape(), &[batch, 3, IMAGE_SIZE, IMAGE_SIZE]);
        assert!(fake.all(|v| (-1.0..=1.0).contains(&v)));
    }
}

#[test]
fn test_discriminator_output_shape_and_range() {
    let mut ctx = Context::with_seed(42);
    let mut discriminator = Discriminator::new(&mut ctx);
    for batch in [1, 2] {
        let images = ctx.randn(&[batch, 3, IMAGE_SIZE, IMAGE_SIZE]);
        let prob = discriminator.forward(&ctx, &images).unwrap();
        assert_eq!(prob.shape(), &[batch]);
        assert!(prob.all(|v| v > 0.0 && v < 1.0));
    }
}

#[test]
fn test_networks_in_eval_mode() {
    let mut ctx = Context::with_seed(3);
    let mut generator = Generator::new(&mut ctx);
    let mut discriminator = Discriminator::new(&mut ctx);
    ctx.set_mode(Mode::Eval);

    let noise = ctx.randn(&[2, LATENT_DIM, 1, 1]);
    let fake = generator.forward(&ctx, &noise).unwrap();
    let prob = discriminator.forward(&ctx, &fake).unwrap();
    assert_eq!(prob.shape(), &[2]);

    // 推理模式下同一输入的输出确定
    let again = generator.forward(&ctx, &noise).unwrap();
    assert_eq!(fake, again);
}

#[test]
fn test_networks_reject_wrong_input() {
    let mut ctx = Context::with_seed(42);
    let mut generator = Generator::new(&mut ctx);
    let err = generator
        .forward(&ctx, &Tensor::zeros(&[2, 64, 1, 1]))
        .unwrap_err();
    assert!(matches!(err, NnError::ShapeMismatch { .. }));

    let mut discriminator = Discriminator::new(&mut ctx);
    let err = discriminator
        .forward(&ctx, &Tensor::zeros(&[2, 3, 32, 32]))
        .unwrap_err();
    assert!(matches!(err, NnError::ShapeMismatch { .. }));
}

#[test]
fn test_parameter_layout() {
    let mut ctx = Context::with_seed(42);
    let generator = Generator::new(&mut ctx);
    let discriminator = Discriminator::new(&mut ctx);

    // G：5 个转置卷积核 + 4 个 BN 各 2 个参数
    assert_eq!(generator.num_params(), 13);
    assert_eq!(generator.parameters()[0].shape(), &[100, 512, 4, 4]);
    assert_eq!(generator.parameters()[12].shape(), &[64, 3, 4, 4]);
    // D：5 个卷积核 + 3 个 BN 各 2 个参数
    assert_eq!(discriminator.num_params(), 11);
    assert_eq!(discriminator.parameters()[0].shape(), &[64, 3, 4, 4]);
    assert_eq!(discriminator.parameters()[10].shape(), &[1, 512, 4, 4]);
    assert_eq!(generator.network().len(), 14);
    assert_eq!(discriminator.network().len(), 13);
}

#[test]
fn test_dcgan_initialization_statistics() {
    let mut ctx = Context::with_seed(42);
    let generator = Generator::new(&mut ctx);
    let params = generator.parameters();

    // 第二个转置卷积核 [512, 256, 4, 4]
    assert_abs_diff_eq!(params[3].mean(), 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(params[3].std(), 0.02, epsilon = 1e-3);
    // 第一个 BN：γ ~ N(1, 0.02)，β = 0
    assert_abs_diff_eq!(params[1].mean(), 1.0, epsilon = 1e-2);
    assert!(params[2].all(|v| v == 0.0));
}

#[test]
fn test_custom_initialization() {
    let mut ctx = Context::with_seed(42);
    let init = WeightInit {
        conv_weight: Init::Constant(0.01),
        ..WeightInit::dcgan()
    };
    let discriminator = Discriminator::new_with_init(&mut ctx, &init);
    assert!(discriminator.parameters()[0].all(|v| v == 0.01));
}

#[test]
fn test_discriminator_backward_returns_image_gradient() {
    let mut ctx = Context::with_seed(42);
    let mut discriminator = Discriminator::new(&mut ctx);
    let images = ctx.randn(&[2, 3, IMAGE_SIZE, IMAGE_SIZE]);
    discriminator.forward(&ctx, &images).unwrap();

    let mut grads = GradBuffer::for_module(&discriminator);
    let grad = discriminator
        .backward(&Tensor::ones(&[2]), &mut grads)
        .unwrap();
    assert_eq!(grad.shape(), images.shape());
    assert!(grads.grads().iter().any(|g| g.all(|v| v.is_finite()) && !g.all(|v| v == 0.0)));
}
