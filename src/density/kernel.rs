use crate::error::{AnalysisError, Result};
use statrs::function::gamma::ln_gamma;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Radially symmetric smoothing kernel.
///
/// Each kernel is a profile `k(r / h)` of the distance `r` to a training point,
/// normalized over `d` dimensions so the density integrates to one.
/// `Tophat`, `Epanechnikov`, `Linear` and `Cosine` have compact support
/// `r < h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kernel {
    #[default]
    Gaussian,
    Tophat,
    Epanechnikov,
    Exponential,
    Linear,
    Cosine,
}

impl Kernel {
    /// Log of the unnormalized profile at distance `dist`, `-inf` outside the
    /// support.
    pub fn log_profile(&self, dist: f64, bandwidth: f64) -> f64 {
        let u = dist / bandwidth;
        match self {
            Kernel::Gaussian => -0.5 * u * u,
            Kernel::Tophat if u < 1.0 => 0.0,
            Kernel::Epanechnikov if u < 1.0 => (1.0 - u * u).ln(),
            Kernel::Exponential => -u,
            Kernel::Linear if u < 1.0 => (1.0 - u).ln(),
            Kernel::Cosine if u < 1.0 => (0.5 * PI * u).cos().ln(),
            _ => f64::NEG_INFINITY,
        }
    }

    /// Log of the profile's integral over `d`-dimensional space.
    pub fn log_normalization(&self, bandwidth: f64, d: usize) -> f64 {
        let d_f = d as f64;
        let log_h = d_f * bandwidth.ln();
        // unit ball volume and unit sphere surface
        let log_ball = 0.5 * d_f * PI.ln() - ln_gamma(0.5 * d_f + 1.0);
        let log_sphere = 2f64.ln() + 0.5 * d_f * PI.ln() - ln_gamma(0.5 * d_f);

        match self {
            Kernel::Gaussian => 0.5 * d_f * (2.0 * PI).ln() + log_h,
            Kernel::Tophat => log_ball + log_h,
            Kernel::Epanechnikov => log_ball + (2.0 / (d_f + 2.0)).ln() + log_h,
            Kernel::Exponential => log_sphere + ln_gamma(d_f) + log_h,
            Kernel::Linear => log_sphere - (d_f * (d_f + 1.0)).ln() + log_h,
            Kernel::Cosine => log_sphere + cosine_radial_moment(d.saturating_sub(1)).ln() + log_h,
        }
    }

    pub fn supports_sampling(&self) -> bool {
        matches!(self, Kernel::Gaussian | Kernel::Tophat)
    }
}

/// `∫₀¹ rⁿ cos(πr/2) dr`, integrating by parts against the matching sine
/// moment. Both moments start at `2/π`; `cos(π/2) = 0` and `sin(π/2) = 1`
/// drop the boundary terms.
fn cosine_radial_moment(n: usize) -> f64 {
    let a = 0.5 * PI;
    let (mut cos_moment, mut sin_moment) = (1.0 / a, 1.0 / a);
    for k in 1..=n {
        let k = k as f64;
        let next_cos = (1.0 - k * sin_moment) / a;
        sin_moment = k * cos_moment / a;
        cos_moment = next_cos;
    }
    cos_moment
}

impl FromStr for Kernel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gaussian" => Ok(Kernel::Gaussian),
            "tophat" => Ok(Kernel::Tophat),
            "epanechnikov" => Ok(Kernel::Epanechnikov),
            "exponential" => Ok(Kernel::Exponential),
            "linear" => Ok(Kernel::Linear),
            "cosine" => Ok(Kernel::Cosine),
            _ => Err(AnalysisError::invalid_parameter(
                "kernel",
                s,
                "supported kernels: gaussian, tophat, epanechnikov, exponential, linear, cosine",
            )),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kernel::Gaussian => "gaussian",
            Kernel::Tophat => "tophat",
            Kernel::Epanechnikov => "epanechnikov",
            Kernel::Exponential => "exponential",
            Kernel::Linear => "linear",
            Kernel::Cosine => "cosine",
        };
        write!(f, "{}", name)
    }
}
