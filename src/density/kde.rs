use crate::density::kernel::Kernel;
use crate::error::{AnalysisError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Kernel density estimate over the rows of a matrix.
///
/// The density at `x` is the mean of kernels of width `bandwidth` centred on
/// every training row.
#[derive(Debug, Clone)]
pub struct KernelDensity {
    kernel: Kernel,
    bandwidth: f64,
    data: Array2<f64>,
}

impl KernelDensity {
    /// # Errors
    /// `InvalidParameter` for a non-positive or non-finite bandwidth, or for
    /// data without rows or columns.
    pub fn fit(data: ArrayView2<f64>, kernel: Kernel, bandwidth: f64) -> Result<Self> {
        if !(bandwidth > 0.0 && bandwidth.is_finite()) {
            return Err(AnalysisError::invalid_parameter(
                "bandwidth",
                bandwidth,
                "must be a positive finite number",
            ));
        }
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(AnalysisError::invalid_parameter(
                "data",
                format!("{}x{}", data.nrows(), data.ncols()),
                "kernel density needs at least one row and one column",
            ));
        }

        Ok(Self {
            kernel,
            bandwidth,
            data: data.to_owned(),
        })
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    /// Log-density of every row of `x`.
    pub fn score_samples(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features() {
            return Err(AnalysisError::dimension_mismatch(
                "density scoring",
                self.n_features(),
                x.ncols(),
            ));
        }

        let log_norm = self.kernel.log_normalization(self.bandwidth, self.n_features())
            + (self.n_samples() as f64).ln();

        Ok(x.rows()
            .into_iter()
            .map(|row| self.log_kernel_sum(row) - log_norm)
            .collect())
    }

    /// Total log-likelihood of `x`.
    pub fn score(&self, x: ArrayView2<f64>) -> Result<f64> {
        Ok(self.score_samples(x)?.sum())
    }

    /// log(sum_i k(|x - x_i| / h)) with the log-sum-exp shift.
    fn log_kernel_sum(&self, x: ArrayView1<f64>) -> f64 {
        let logs: Vec<f64> = self
            .data
            .rows()
            .into_iter()
            .map(|row| {
                let dist = row
                    .iter()
                    .zip(x.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
                    .sqrt();
                self.kernel.log_profile(dist, self.bandwidth)
            })
            .collect();

        let max = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return max;
        }
        max + logs.iter().map(|l| (l - max).exp()).sum::<f64>().ln()
    }

    /// Draws `n` points: a training row chosen uniformly, displaced by kernel
    /// noise.
    ///
    /// # Errors
    /// `InvalidParameter` for kernels without a sampler (only gaussian and
    /// tophat have one).
    pub fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>> {
        if !self.kernel.supports_sampling() {
            return Err(AnalysisError::invalid_parameter(
                "kernel",
                self.kernel,
                "sampling is only supported for gaussian and tophat kernels",
            ));
        }

        let d = self.n_features();
        let mut samples = Array2::zeros((n, d));
        for mut out in samples.rows_mut() {
            let center = self.data.row(rng.random_range(0..self.n_samples()));
            let noise: Vec<f64> = (0..d).map(|_| StandardNormal.sample(rng)).collect();

            let factor = match self.kernel {
                Kernel::Gaussian => self.bandwidth,
                _ => {
                    // uniform point in the ball of radius h
                    let norm = noise.iter().map(|v| v * v).sum::<f64>().sqrt();
                    let radius = self.bandwidth * rng.random::<f64>().powf(1.0 / d as f64);
                    if norm > 0.0 {
                        radius / norm
                    } else {
                        0.0
                    }
                }
            };

            for ((o, &c), z) in out.iter_mut().zip(center.iter()).zip(noise) {
                *o = c + factor * z;
            }
        }
        Ok(samples)
    }
}
