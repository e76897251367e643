/*
 * @Description  : 张量的四则运算。
 *                 1. 张量与纯数：逐元素运算，返回形状与该张量相同；
 *                 2. 张量与张量：两者形状必须完全相同（不做广播），否则panic。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Sub};

fn assert_same_shape(a: &Tensor, b: &Tensor, operator: Operator) {
    assert!(
        a.is_same_shape(b),
        "{}",
        TensorError::OperatorError {
            operator,
            tensor1_shape: a.shape().to_vec(),
            tensor2_shape: b.shape().to_vec(),
        }
    );
}

/// 为（不）带引用的张量之间实现逐元素运算
macro_rules! impl_tensor_binary_op {
    ($trait:ident, $method:ident, $op:tt, $operator:expr) => {
        impl<'a> $trait<&'a Tensor> for &'a Tensor {
            type Output = Tensor;

            fn $method(self, other: &'a Tensor) -> Tensor {
                assert_same_shape(self, other, $operator);
                Tensor::from_array(&self.data $op &other.data)
            }
        }
        impl $trait<Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                (&self).$method(&other)
            }
        }
        impl<'a> $trait<&'a Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: &'a Tensor) -> Tensor {
                (&self).$method(other)
            }
        }
        impl $trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor::from_array(&self.data $op scalar)
            }
        }
        impl $trait<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor::from_array(self.data $op scalar)
            }
        }
    };
}

impl_tensor_binary_op!(Add, add, +, Operator::Add);
impl_tensor_binary_op!(Sub, sub, -, Operator::Sub);
impl_tensor_binary_op!(Mul, mul, *, Operator::Mul);
impl_tensor_binary_op!(Div, div, /, Operator::Div);

impl Mul<&Tensor> for f32 {
    type Output = Tensor;

    fn mul(self, tensor: &Tensor) -> Tensor {
        tensor * self
    }
}

impl AddAssign<&Tensor> for Tensor {
    fn add_assign(&mut self, other: &Tensor) {
        assert_same_shape(self, other, Operator::AddAssign);
        self.data += &other.data;
    }
}

impl MulAssign<f32> for Tensor {
    fn mul_assign(&mut self, scalar: f32) {
        self.data *= scalar;
    }
}
