mod sequential;

use crate::context::Context;
use crate::nn::TraitLayer;
use crate::nn::layer::Layer;
use crate::tensor::Tensor;

/// 以`sum(layer(x) * probe)`为标量损失，用中心差分估计其对x第`idx`个元素的导数
pub(super) fn numeric_input_grad(
    layer: &mut Layer,
    ctx: &Context,
    x: &Tensor,
    probe: &Tensor,
    idx: usize,
    eps: f32,
) -> f32 {
    let mut loss_at = |delta: f32| {
        let mut shifted = x.clone();
        shifted.as_slice_mut()[idx] += delta;
        let y = layer.forward(ctx, &shifted).unwrap();
        (&y * probe).sum()
    };
    (loss_at(eps) - loss_at(-eps)) / (2.0 * eps)
}

/// 逐元素比较解析梯度与数值梯度（只检查前`count`个元素）
pub(super) fn check_input_grad(layer: &mut Layer, ctx: &Context, x: &Tensor, count: usize, tol: f32) {
    let y = layer.forward(ctx, x).unwrap();
    let mut probe_ctx = Context::with_seed(7);
    let probe = probe_ctx.randn(y.shape());

    let mut slots: Vec<Tensor> = layer.parameters().into_iter().map(Tensor::zeros_like).collect();
    layer.forward(ctx, x).unwrap();
    let grad_input = layer.backward(&probe, &mut slots).unwrap();
    assert_eq!(grad_input.shape(), x.shape());

    for idx in 0..count.min(x.size()) {
        let numeric = numeric_input_grad(layer, ctx, x, &probe, idx, 1e-2);
        let analytic = grad_input.as_slice()[idx];
        assert!(
            (numeric - analytic).abs() <= tol * (1.0 + numeric.abs()),
            "{}：第{idx}个元素的梯度不符，解析{analytic}，数值{numeric}",
            layer.name()
        );
    }
}
