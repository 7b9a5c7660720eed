//! Affine (fully connected) transform
//!
//! Performs `y = xW + b` where each sample of `x` (of any trailing shape) is
//! flattened into a row of length `D`, `W` is `(D, M)` row-major and `b` is
//! `(M,)`.

use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Inputs the affine backward pass needs.
#[derive(Debug)]
pub struct AffineCache<'a, T> {
    x: &'a Tensor<T>,
    w: &'a Tensor<T>,
}

fn row_dims<T: Scalar>(x: &Tensor<T>, w: &Tensor<T>) -> (usize, usize, usize) {
    assert!(x.ndim() >= 1, "affine input must have a batch dimension");
    assert_eq!(w.ndim(), 2, "affine weights must be (D, M)");
    let n = x.dim(0);
    let d: usize = x.shape()[1..].iter().product();
    assert_eq!(d, w.dim(0), "affine input width mismatch");
    (n, d, w.dim(1))
}

/// Forward pass producing `(N, M)` outputs.
///
/// # Panics
///
/// Panics if the flattened input width differs from `W`'s row count or `b`
/// is not `(M,)`.
pub fn forward<'a, T: Scalar>(
    x: &'a Tensor<T>,
    w: &'a Tensor<T>,
    b: &Tensor<T>,
) -> (Tensor<T>, AffineCache<'a, T>) {
    let (n, d, m) = row_dims(x, w);
    assert_eq!(b.shape(), &[m], "affine bias must be (M,)");

    let mut out = Tensor::zeros(&[n, m]);
    let (xd, wd, bd) = (x.data(), w.data(), b.data());

    for (row, out_row) in out.data_mut().chunks_exact_mut(m.max(1)).enumerate().take(n) {
        out_row.copy_from_slice(bd);
        let x_row = &xd[row * d..(row + 1) * d];
        for (k, &xv) in x_row.iter().enumerate() {
            let w_row = &wd[k * m..(k + 1) * m];
            for (o, &wv) in out_row.iter_mut().zip(w_row.iter()) {
                *o = *o + xv * wv;
            }
        }
    }

    (out, AffineCache { x, w })
}

/// Backward pass returning `(dx, dw, db)`; `dx` has the original input shape.
///
/// # Panics
///
/// Panics if `dout` is not `(N, M)`.
pub fn backward<T: Scalar>(
    dout: &Tensor<T>,
    cache: &AffineCache<'_, T>,
) -> (Tensor<T>, Tensor<T>, Tensor<T>) {
    let (x, w) = (cache.x, cache.w);
    let (n, d, m) = row_dims(x, w);
    assert_eq!(dout.shape(), &[n, m], "affine upstream gradient shape mismatch");

    let mut dx = Tensor::zeros_like(x);
    let mut dw = Tensor::zeros_like(w);
    let mut db = Tensor::zeros(&[m]);

    let (xd, wd, gd) = (x.data(), w.data(), dout.data());
    let dxd = dx.data_mut();
    let dwd = dw.data_mut();
    let dbd = db.data_mut();

    for row in 0..n {
        let g_row = &gd[row * m..(row + 1) * m];
        for (acc, &g) in dbd.iter_mut().zip(g_row.iter()) {
            *acc = *acc + g;
        }

        for k in 0..d {
            let xv = xd[row * d + k];
            let w_row = &wd[k * m..(k + 1) * m];
            let dw_row = &mut dwd[k * m..(k + 1) * m];

            let mut dot = T::zero();
            for j in 0..m {
                dot = dot + g_row[j] * w_row[j];
                dw_row[j] = dw_row[j] + xv * g_row[j];
            }
            dxd[row * d + k] = dot;
        }
    }

    (dx, dw, db)
}
