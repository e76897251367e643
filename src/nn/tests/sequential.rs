/*
 * @Description  : Sequential 组合测试（前向、反向、梯度槽位切分）
 */

use crate::context::Context;
use crate::nn::layer::{Activation, BatchNorm2d, Conv2d, Sequential};
use crate::nn::{GradBuffer, Module, NnError};
use crate::tensor::Tensor;

fn build(ctx: &mut Context) -> Sequential {
    Sequential::new()
        .push(Conv2d::new(ctx, 2, 3, 3, 1, 1, "conv"))
        .push(BatchNorm2d::new(3, "bn"))
        .push(Activation::leaky_relu(0.2, "leaky"))
        .push(Conv2d::new(ctx, 3, 1, 4, 1, 0, "head"))
}

/// sum(net(x) * probe)
fn probe_loss(net: &mut Sequential, ctx: &Context, x: &Tensor, probe: &Tensor) -> f32 {
    (&net.forward(ctx, x).unwrap() * probe).sum()
}

#[test]
fn test_sequential_forward_shape() {
    let mut ctx = Context::with_seed(42);
    let mut net = build(&mut ctx);
    assert_eq!(net.len(), 4);
    assert_eq!(net.num_params(), 4);

    let x = ctx.randn(&[3, 2, 4, 4]);
    let y = net.forward(&ctx, &x).unwrap();
    assert_eq!(y.shape(), &[3, 1, 1, 1]);
}

#[test]
fn test_sequential_empty_is_identity() {
    let ctx = Context::with_seed(0);
    let mut net = Sequential::new();
    assert!(net.is_empty());
    let x = Tensor::new(&[1.0, 2.0], &[2]);
    assert_eq!(net.forward(&ctx, &x).unwrap(), x);
}

#[test]
fn test_sequential_parameter_gradient_matches_finite_difference() {
    let mut ctx = Context::with_seed(42);
    let mut net = build(&mut ctx);
    let x = ctx.randn(&[3, 2, 4, 4]);
    let probe = ctx.randn(&[3, 1, 1, 1]);

    net.forward(&ctx, &x).unwrap();
    let mut grads = GradBuffer::for_module(&net);
    let grad_input = net.backward(&probe, &mut grads).unwrap();
    assert_eq!(grad_input.shape(), x.shape());
    assert_eq!(grads.len(), net.num_params());

    // 检查首层卷积核与BN的γ中的若干元素
    let eps = 1e-2;
    for (param_idx, elem_idx) in [(0, 0), (0, 7), (0, 31), (1, 0), (1, 2), (3, 5)] {
        let mut shifted = |delta: f32| {
            net.parameters_mut()[param_idx].as_slice_mut()[elem_idx] += delta;
            let loss = probe_loss(&mut net, &ctx, &x, &probe);
            net.parameters_mut()[param_idx].as_slice_mut()[elem_idx] -= delta;
            loss
        };
        let numeric = (shifted(eps) - shifted(-eps)) / (2.0 * eps);
        let analytic = grads.grads()[param_idx].as_slice()[elem_idx];
        assert!(
            (numeric - analytic).abs() <= 2e-2 * (1.0 + numeric.abs()),
            "参数{param_idx}的第{elem_idx}个元素梯度不符：解析{analytic}，数值{numeric}"
        );
    }
}

#[test]
fn test_sequential_backward_rejects_wrong_buffer() {
    let mut ctx = Context::with_seed(42);
    let mut net = build(&mut ctx);
    let x = ctx.randn(&[2, 2, 4, 4]);
    net.forward(&ctx, &x).unwrap();

    let mut grads = GradBuffer::zeros(&[vec![1]]);
    let err = net
        .backward(&Tensor::ones(&[2, 1, 1, 1]), &mut grads)
        .unwrap_err();
    assert_eq!(
        err,
        NnError::ParameterCountMismatch {
            expected: 4,
            got: 1
        }
    );
}
