//! Max pooling over non-overlapping (or strided) spatial windows

use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Window size and stride of a max-pool layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolParams {
    pub height: usize,
    pub width: usize,
    pub stride: usize,
}

impl Default for PoolParams {
    /// 2x2 windows with stride 2, halving each spatial dimension.
    fn default() -> Self {
        Self {
            height: 2,
            width: 2,
            stride: 2,
        }
    }
}

/// Routing information for the backward pass.
#[derive(Debug, Clone)]
pub struct PoolCache {
    input_shape: Vec<usize>,
    /// Flat input index of the maximum for every output element.
    argmax: Vec<usize>,
}

/// Forward pass. Ties resolve to the first maximum in row-major window order.
///
/// # Panics
///
/// Panics if `x` is not 4-D or the windows do not tile the input exactly.
pub fn forward<T: Scalar>(x: &Tensor<T>, params: PoolParams) -> (Tensor<T>, PoolCache) {
    assert_eq!(x.ndim(), 4, "pool input must be (N, C, H, W)");
    let (n, c, h, w) = (x.dim(0), x.dim(1), x.dim(2), x.dim(3));
    assert!(
        params.stride > 0 && h >= params.height && w >= params.width,
        "pool window larger than input"
    );
    assert!(
        (h - params.height) % params.stride == 0 && (w - params.width) % params.stride == 0,
        "pool windows do not tile the input"
    );

    let out_h = (h - params.height) / params.stride + 1;
    let out_w = (w - params.width) / params.stride + 1;

    let mut out = Tensor::zeros(&[n, c, out_h, out_w]);
    let mut argmax = vec![0usize; n * c * out_h * out_w];
    let xd = x.data();
    let od = out.data_mut();

    for plane in 0..n * c {
        let in_base = plane * h * w;
        let out_base = plane * out_h * out_w;

        for py in 0..out_h {
            for px in 0..out_w {
                let y0 = py * params.stride;
                let x0 = px * params.stride;

                let mut best_idx = in_base + y0 * w + x0;
                let mut best = xd[best_idx];
                for dy in 0..params.height {
                    for dx in 0..params.width {
                        let idx = in_base + (y0 + dy) * w + x0 + dx;
                        if xd[idx] > best {
                            best = xd[idx];
                            best_idx = idx;
                        }
                    }
                }

                let o = out_base + py * out_w + px;
                od[o] = best;
                argmax[o] = best_idx;
            }
        }
    }

    (
        out,
        PoolCache {
            input_shape: x.shape().to_vec(),
            argmax,
        },
    )
}

/// Backward pass: each upstream gradient flows to its window's maximum.
///
/// # Panics
///
/// Panics if `dout` has a different element count than the forward output.
pub fn backward<T: Scalar>(dout: &Tensor<T>, cache: &PoolCache) -> Tensor<T> {
    assert_eq!(
        dout.len(),
        cache.argmax.len(),
        "pool upstream gradient shape mismatch"
    );

    let mut dx = Tensor::zeros(&cache.input_shape);
    let dxd = dx.data_mut();
    for (&grad, &idx) in dout.data().iter().zip(cache.argmax.iter()) {
        dxd[idx] = dxd[idx] + grad;
    }
    dx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tensor<f64> {
        #[rustfmt::skip]
        let data = vec![
            1.0, 2.0, 5.0, 0.0,
            3.0, 4.0, 1.0, 1.0,
            0.0, -1.0, 7.0, 8.0,
            -2.0, -3.0, 9.0, 6.0,
        ];
        Tensor::from_vec(&[1, 1, 4, 4], data).unwrap()
    }

    #[test]
    fn test_forward_takes_window_max() {
        let (out, _) = forward(&sample(), PoolParams::default());
        assert_eq!(out.shape(), &[1, 1, 2, 2]);
        assert_eq!(out.data(), &[4.0, 5.0, 0.0, 9.0]);
    }

    #[test]
    fn test_backward_routes_to_argmax_only() {
        let (_, cache) = forward(&sample(), PoolParams::default());
        let dout = Tensor::from_vec(&[1, 1, 2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        let dx = backward(&dout, &cache);

        #[rustfmt::skip]
        let expected = vec![
            0.0, 0.0, 2.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            3.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 4.0, 0.0,
        ];
        assert_eq!(dx.data(), expected.as_slice());
    }

    #[test]
    fn test_ties_pick_first_element() {
        let x = Tensor::<f32>::zeros(&[1, 1, 2, 2]);
        let (_, cache) = forward(&x, PoolParams::default());
        let dx = backward(&Tensor::full(&[1, 1, 1, 1], 1.0), &cache);
        assert_eq!(dx.data(), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "pool windows do not tile the input")]
    fn test_odd_input_panics() {
        let x = Tensor::<f32>::zeros(&[1, 1, 3, 4]);
        let _ = forward(&x, PoolParams::default());
    }
}
