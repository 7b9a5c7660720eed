//! Naive 2D convolution
//!
//! Slides `F` filters of shape `(C, HH, WW)` over a zero-padded NCHW batch.
//! Output spatial size is `1 + (H + 2 * pad - HH) / stride`.

use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Stride and symmetric zero padding of a convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvParams {
    pub stride: usize,
    pub pad: usize,
}

impl ConvParams {
    /// Stride 1 with the padding that preserves spatial size for an odd
    /// `filter_size`.
    pub fn same(filter_size: usize) -> Self {
        Self {
            stride: 1,
            pad: (filter_size - 1) / 2,
        }
    }
}

/// Output length along one spatial axis.
pub fn output_dim(input: usize, kernel: usize, stride: usize, pad: usize) -> usize {
    (input + 2 * pad - kernel) / stride + 1
}

/// Values the convolution backward pass needs from its forward pass.
#[derive(Debug)]
pub struct ConvCache<'a, T> {
    x: &'a Tensor<T>,
    w: &'a Tensor<T>,
    params: ConvParams,
}

struct Geometry {
    n: usize,
    c: usize,
    h: usize,
    w: usize,
    f: usize,
    kh: usize,
    kw: usize,
    out_h: usize,
    out_w: usize,
}

impl Geometry {
    fn new<T: Scalar>(x: &Tensor<T>, w: &Tensor<T>, params: ConvParams) -> Self {
        assert_eq!(x.ndim(), 4, "conv input must be (N, C, H, W)");
        assert_eq!(w.ndim(), 4, "conv weights must be (F, C, HH, WW)");
        assert_eq!(x.dim(1), w.dim(1), "conv channel mismatch");
        assert!(params.stride > 0, "conv stride must be positive");

        let (h, width) = (x.dim(2), x.dim(3));
        let (kh, kw) = (w.dim(2), w.dim(3));
        assert!(
            h + 2 * params.pad >= kh && width + 2 * params.pad >= kw,
            "conv filter larger than padded input"
        );
        assert_eq!(
            (h + 2 * params.pad - kh) % params.stride,
            0,
            "conv stride does not tile the padded height"
        );
        assert_eq!(
            (width + 2 * params.pad - kw) % params.stride,
            0,
            "conv stride does not tile the padded width"
        );

        Self {
            n: x.dim(0),
            c: x.dim(1),
            h,
            w: width,
            f: w.dim(0),
            kh,
            kw,
            out_h: output_dim(h, kh, params.stride, params.pad),
            out_w: output_dim(width, kw, params.stride, params.pad),
        }
    }

    /// Input coordinate for output position `o` and kernel offset `k`, or
    /// `None` when it falls into the zero padding.
    fn source(o: usize, k: usize, stride: usize, pad: usize, limit: usize) -> Option<usize> {
        let pos = (o * stride + k) as isize - pad as isize;
        if pos >= 0 && (pos as usize) < limit {
            Some(pos as usize)
        } else {
            None
        }
    }
}

/// Forward pass: `out[n, f] = sum_c x[n, c] * w[f, c] + b[f]`.
///
/// # Panics
///
/// Panics if the tensor shapes are inconsistent.
pub fn forward<'a, T: Scalar>(
    x: &'a Tensor<T>,
    w: &'a Tensor<T>,
    b: &Tensor<T>,
    params: ConvParams,
) -> (Tensor<T>, ConvCache<'a, T>) {
    let g = Geometry::new(x, w, params);
    assert_eq!(b.shape(), &[g.f], "conv bias must be (F,)");

    let in_spatial = g.h * g.w;
    let out_spatial = g.out_h * g.out_w;
    let mut out = Tensor::zeros(&[g.n, g.f, g.out_h, g.out_w]);

    let (xd, wd, bd) = (x.data(), w.data(), b.data());
    let od = out.data_mut();

    for n in 0..g.n {
        let in_base = n * g.c * in_spatial;
        let out_base_n = n * g.f * out_spatial;

        for f in 0..g.f {
            let out_base = out_base_n + f * out_spatial;

            for oy in 0..g.out_h {
                for ox in 0..g.out_w {
                    let mut sum = bd[f];

                    for c in 0..g.c {
                        let w_base = (f * g.c + c) * g.kh * g.kw;
                        let in_base_c = in_base + c * in_spatial;

                        for ky in 0..g.kh {
                            let Some(iy) =
                                Geometry::source(oy, ky, params.stride, params.pad, g.h)
                            else {
                                continue;
                            };
                            for kx in 0..g.kw {
                                if let Some(ix) =
                                    Geometry::source(ox, kx, params.stride, params.pad, g.w)
                                {
                                    sum = sum
                                        + xd[in_base_c + iy * g.w + ix]
                                            * wd[w_base + ky * g.kw + kx];
                                }
                            }
                        }
                    }

                    od[out_base + oy * g.out_w + ox] = sum;
                }
            }
        }
    }

    (out, ConvCache { x, w, params })
}

/// Backward pass returning `(dx, dw, db)`.
///
/// # Panics
///
/// Panics if `dout` does not match the forward output shape.
pub fn backward<T: Scalar>(
    dout: &Tensor<T>,
    cache: &ConvCache<'_, T>,
) -> (Tensor<T>, Tensor<T>, Tensor<T>) {
    let ConvCache { x, w, params } = *cache;
    let g = Geometry::new(x, w, params);
    assert_eq!(
        dout.shape(),
        &[g.n, g.f, g.out_h, g.out_w],
        "conv upstream gradient shape mismatch"
    );

    let in_spatial = g.h * g.w;
    let out_spatial = g.out_h * g.out_w;

    let mut dx = Tensor::zeros_like(x);
    let mut dw = Tensor::zeros_like(w);
    let mut db = Tensor::zeros(&[g.f]);

    let (xd, wd, gd) = (x.data(), w.data(), dout.data());
    let dxd = dx.data_mut();
    let dwd = dw.data_mut();
    let dbd = db.data_mut();

    for n in 0..g.n {
        let in_base = n * g.c * in_spatial;
        let g_base_n = n * g.f * out_spatial;

        for f in 0..g.f {
            let g_base = g_base_n + f * out_spatial;

            for &grad in &gd[g_base..g_base + out_spatial] {
                dbd[f] = dbd[f] + grad;
            }

            for c in 0..g.c {
                let w_base = (f * g.c + c) * g.kh * g.kw;
                let in_base_c = in_base + c * in_spatial;

                for oy in 0..g.out_h {
                    for ox in 0..g.out_w {
                        let grad = gd[g_base + oy * g.out_w + ox];

                        for ky in 0..g.kh {
                            let Some(iy) =
                                Geometry::source(oy, ky, params.stride, params.pad, g.h)
                            else {
                                continue;
                            };
                            for kx in 0..g.kw {
                                if let Some(ix) =
                                    Geometry::source(ox, kx, params.stride, params.pad, g.w)
                                {
                                    let in_idx = in_base_c + iy * g.w + ix;
                                    let w_idx = w_base + ky * g.kw + kx;
                                    dwd[w_idx] = dwd[w_idx] + grad * xd[in_idx];
                                    dxd[in_idx] = dxd[in_idx] + grad * wd[w_idx];
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    (dx, dw, db)
}
