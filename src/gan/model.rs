/*
 * @Description  : DCGAN 的生成器与判别器
 *
 * Generator:     z [B, 100, 1, 1]
 *                -> ConvT(100→512, 4, 1, 0) + BN + ReLU     4x4
 *                -> ConvT(512→256, 4, 2, 1) + BN + ReLU     8x8
 *                -> ConvT(256→128, 4, 2, 1) + BN + ReLU     16x16
 *                -> ConvT(128→64,  4, 2, 1) + BN + ReLU     32x32
 *                -> ConvT(64→3,    4, 2, 1) + Tanh          64x64
 *
 * Discriminator: x [B, 3, 64, 64]
 *                -> Conv(3→64,    4, 2, 1) + LeakyReLU(0.2)        32x32
 *                -> Conv(64→128,  4, 2, 1) + BN + LeakyReLU(0.2)   16x16
 *                -> Conv(128→256, 4, 2, 1) + BN + LeakyReLU(0.2)   8x8
 *                -> Conv(256→512, 4, 2, 1) + BN + LeakyReLU(0.2)   4x4
 *                -> Conv(512→1,   4, 1, 0) + Sigmoid               1x1 -> [B]
 *
 * 所有卷积均无偏置；构建后立即按`WeightInit`初始化一次。
 */

use crate::context::Context;
use crate::nn::layer::{Activation, BatchNorm2d, Conv2d, ConvTranspose2d, Sequential};
use crate::nn::{GradBuffer, Module, NnError, WeightInit};
use crate::tensor::Tensor;

/// 潜向量维度
pub const LATENT_DIM: usize = 100;
/// 图像通道数
pub const IMAGE_CHANNELS: usize = 3;
/// 图像边长
pub const IMAGE_SIZE: usize = 64;
/// 生成器的基础特征图数
const GENERATOR_FEATURES: usize = 64;
/// 判别器的基础特征图数
const DISCRIMINATOR_FEATURES: usize = 64;
const LEAKY_SLOPE: f32 = 0.2;

fn expect_shape(input: &Tensor, expected: &[usize], message: &str) -> Result<(), NnError> {
    let shape = input.shape();
    let matches = shape.len() == expected.len()
        && shape[0] > 0
        && shape[1..] == expected[1..];
    if !matches {
        return Err(NnError::ShapeMismatch {
            expected: expected.to_vec(),
            got: shape.to_vec(),
            message: message.to_string(),
        });
    }
    Ok(())
}

pub struct Generator {
    main: Sequential,
}

impl Generator {
    /// 以 DCGAN 初始化策略构建生成器
    pub fn new(ctx: &mut Context) -> Self {
        Self::new_with_init(ctx, &WeightInit::dcgan())
    }

    pub fn new_with_init(ctx: &mut Context, init: &WeightInit) -> Self {
        let ngf = GENERATOR_FEATURES;
        let mut main = Sequential::new()
            // 1x1 -> 4x4
            .push(ConvTranspose2d::new(ctx, LATENT_DIM, ngf * 8, 4, 1, 0, "g_deconv1"))
            .push(BatchNorm2d::new(ngf * 8, "g_bn1"))
            .push(Activation::relu("g_relu1"))
            // 4x4 -> 8x8
            .push(ConvTranspose2d::new(ctx, ngf * 8, ngf * 4, 4, 2, 1, "g_deconv2"))
            .push(BatchNorm2d::new(ngf * 4, "g_bn2"))
            .push(Activation::relu("g_relu2"))
            // 8x8 -> 16x16
            .push(ConvTranspose2d::new(ctx, ngf * 4, ngf * 2, 4, 2, 1, "g_deconv3"))
            .push(BatchNorm2d::new(ngf * 2, "g_bn3"))
            .push(Activation::relu("g_relu3"))
            // 16x16 -> 32x32
            .push(ConvTranspose2d::new(ctx, ngf * 2, ngf, 4, 2, 1, "g_deconv4"))
            .push(BatchNorm2d::new(ngf, "g_bn4"))
            .push(Activation::relu("g_relu4"))
            // 32x32 -> 64x64
            .push(ConvTranspose2d::new(ctx, ngf, IMAGE_CHANNELS, 4, 2, 1, "g_deconv5"))
            .push(Activation::tanh("g_tanh"));
        init.apply(&mut main, ctx.rng());
        Self { main }
    }

    /// [B, 100, 1, 1] -> [B, 3, 64, 64]，值域[-1, 1]
    pub fn forward(&mut self, ctx: &Context, noise: &Tensor) -> Result<Tensor, NnError> {
        expect_shape(
            noise,
            &[0, LATENT_DIM, 1, 1],
            "生成器的输入必须是[batch, 100, 1, 1]",
        )?;
        self.main.forward(ctx, noise)
    }

    /// 反向传播：参数梯度累加进`grads`，返回对噪声的梯度
    pub fn backward(
        &mut self,
        grad_output: &Tensor,
        grads: &mut GradBuffer,
    ) -> Result<Tensor, NnError> {
        self.main.backward(grad_output, grads)
    }

    pub fn network(&self) -> &Sequential {
        &self.main
    }
}

impl Module for Generator {
    fn parameters(&self) -> Vec<&Tensor> {
        self.main.parameters()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.main.parameters_mut()
    }
}

pub struct Discriminator {
    main: Sequential,
}

impl Discriminator {
    /// 以 DCGAN 初始化策略构建判别器
    pub fn new(ctx: &mut Context) -> Self {
        Self::new_with_init(ctx, &WeightInit::dcgan())
    }

    pub fn new_with_init(ctx: &mut Context, init: &WeightInit) -> Self {
        let ndf = DISCRIMINATOR_FEATURES;
        let mut main = Sequential::new()
            // 64x64 -> 32x32
            .push(Conv2d::new(ctx, IMAGE_CHANNELS, ndf, 4, 2, 1, "d_conv1"))
            .push(Activation::leaky_relu(LEAKY_SLOPE, "d_leaky1"))
            // 32x32 -> 16x16
            .push(Conv2d::new(ctx, ndf, ndf * 2, 4, 2, 1, "d_conv2"))
            .push(BatchNorm2d::new(ndf * 2, "d_bn2"))
            .push(Activation::leaky_relu(LEAKY_SLOPE, "d_leaky2"))
            // 16x16 -> 8x8
            .push(Conv2d::new(ctx, ndf * 2, ndf * 4, 4, 2, 1, "d_conv3"))
            .push(BatchNorm2d::new(ndf * 4, "d_bn3"))
            .push(Activation::leaky_relu(LEAKY_SLOPE, "d_leaky3"))
            // 8x8 -> 4x4
            .push(Conv2d::new(ctx, ndf * 4, ndf * 8, 4, 2, 1, "d_conv4"))
            .push(BatchNorm2d::new(ndf * 8, "d_bn4"))
            .push(Activation::leaky_relu(LEAKY_SLOPE, "d_leaky4"))
            // 4x4 -> 1x1
            .push(Conv2d::new(ctx, ndf * 8, 1, 4, 1, 0, "d_conv5"))
            .push(Activation::sigmoid("d_sigmoid"));
        init.apply(&mut main, ctx.rng());
        Self { main }
    }

    /// [B, 3, 64, 64] -> [B]，每个元素是“为真实图像”的概率
    pub fn forward(&mut self, ctx: &Context, images: &Tensor) -> Result<Tensor, NnError> {
        expect_shape(
            images,
            &[0, IMAGE_CHANNELS, IMAGE_SIZE, IMAGE_SIZE],
            "判别器的输入必须是[batch, 3, 64, 64]",
        )?;
        let batch = images.shape()[0];
        Ok(self.main.forward(ctx, images)?.into_shape(&[batch])?)
    }

    /// 反向传播：`grad_output`形状为[B]；参数梯度累加进`grads`，返回对输入图像的梯度
    pub fn backward(
        &mut self,
        grad_output: &Tensor,
        grads: &mut GradBuffer,
    ) -> Result<Tensor, NnError> {
        let batch = grad_output.size();
        let grad = grad_output.reshape(&[batch, 1, 1, 1])?;
        self.main.backward(&grad, grads)
    }

    pub fn network(&self) -> &Sequential {
        &self.main
    }
}

impl Module for Discriminator {
    fn parameters(&self) -> Vec<&Tensor> {
        self.main.parameters()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.main.parameters_mut()
    }
}
