//! Ridge-regularized least squares on standardized features. Deterministic,
//! no iterative solver: the normal equations are small (8x8) and solved by
//! Gaussian elimination with partial pivoting.

use crate::error::PredictError;

#[derive(Debug, Clone)]
pub(crate) struct Standardizer {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl Standardizer {
    pub fn fit(rows: &[&[f64]]) -> Self {
        let dims = rows.first().map_or(0, |r| r.len());
        let n = rows.len() as f64;
        let mut means = vec![0.0; dims];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }
        let mut stds = vec![0.0; dims];
        for row in rows {
            for ((s, v), m) in stds.iter_mut().zip(row.iter()).zip(&means) {
                *s += (v - m) * (v - m);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
            // Constant columns pass through unscaled.
            if *s < 1e-12 {
                *s = 1.0;
            }
        }
        Standardizer { means, stds }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .zip(&self.stds)
            .map(|((v, m), s)| (v - m) / s)
            .collect()
    }
}

/// One regression head: weights over standardized features plus intercept.
#[derive(Debug, Clone)]
pub(crate) struct RidgeHead {
    weights: Vec<f64>,
    intercept: f64,
    pub r_squared: f64,
}

impl RidgeHead {
    /// Fit on already-standardized feature rows.
    pub fn fit(x: &[Vec<f64>], y: &[f64], lambda: f64) -> Result<Self, PredictError> {
        let n = x.len();
        let dims = x[0].len();
        let y_mean = y.iter().sum::<f64>() / n as f64;

        // Normal equations on centered targets: (XᵀX + λI) w = Xᵀ(y - ȳ)
        let mut a = vec![vec![0.0; dims]; dims];
        let mut b = vec![0.0; dims];
        for (row, &target) in x.iter().zip(y) {
            let centered = target - y_mean;
            for i in 0..dims {
                b[i] += row[i] * centered;
                for j in 0..dims {
                    a[i][j] += row[i] * row[j];
                }
            }
        }
        for (i, row) in a.iter_mut().enumerate() {
            row[i] += lambda;
        }

        let weights =
            solve(a, b).ok_or_else(|| PredictError::Fit("singular normal equations".into()))?;

        let head = RidgeHead {
            weights,
            intercept: y_mean,
            r_squared: 0.0,
        };
        let ss_res: f64 = x
            .iter()
            .zip(y)
            .map(|(row, &t)| (t - head.predict(row)).powi(2))
            .sum();
        let ss_tot: f64 = y.iter().map(|&t| (t - y_mean).powi(2)).sum();
        let r_squared = if ss_tot < 1e-12 {
            1.0
        } else {
            1.0 - ss_res / ss_tot
        };
        Ok(RidgeHead { r_squared, ..head })
    }

    pub fn predict(&self, standardized: &[f64]) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(standardized)
                .map(|(w, v)| w * v)
                .sum::<f64>()
    }
}

fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
