use crate::error::{AnalysisError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Column standardization to zero mean and unit population variance.
///
/// A column with zero variance keeps a scale of `1.0`, so it is centered to
/// all zeros instead of dividing by zero.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: ArrayView2<f64>) -> Result<&mut Self> {
        let mean = x.mean_axis(Axis(0)).ok_or_else(|| {
            AnalysisError::invalid_parameter("rows", 0, "cannot standardize an empty matrix")
        })?;
        let n = x.nrows() as f64;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .iter()
            .zip(mean.iter())
            .map(|(&s, &m)| if is_constant(s * s, m, n) { 1.0 } else { s })
            .collect::<Array1<f64>>();

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(self)
    }

    fn fitted(&self) -> Result<(&Array1<f64>, &Array1<f64>)> {
        match (&self.mean, &self.scale) {
            (Some(mean), Some(scale)) => Ok((mean, scale)),
            _ => Err(AnalysisError::NotFitted(
                "StandardScaler must be fitted before transform".to_string(),
            )),
        }
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (mean, scale) = self.fitted()?;
        if x.ncols() != mean.len() {
            return Err(AnalysisError::dimension_mismatch(
                "scaler input",
                mean.len(),
                x.ncols(),
            ));
        }

        let mut result = x.to_owned();
        for mut row in result.axis_iter_mut(Axis(0)) {
            row -= mean;
            row /= scale;
        }
        Ok(result)
    }

    pub fn inverse_transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (mean, scale) = self.fitted()?;
        if x.ncols() != mean.len() {
            return Err(AnalysisError::dimension_mismatch(
                "scaler inverse input",
                mean.len(),
                x.ncols(),
            ));
        }

        let mut result = x.to_owned();
        for mut row in result.axis_iter_mut(Axis(0)) {
            row *= scale;
            row += mean;
        }
        Ok(result)
    }

    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }
}

/// A variance within the rounding error of summing `n` values around `mean`
/// counts as zero.
fn is_constant(variance: f64, mean: f64, n: f64) -> bool {
    let eps = f64::EPSILON;
    let bound = n * eps * variance + (n * mean * eps).powi(2);
    variance <= bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let data = array![[1.0, 2.0], [3.0, 4.0], [5.0, 9.0]];
        let mut scaler = StandardScaler::new();

        let scaled = scaler.fit_transform(data.view()).unwrap();
        assert_eq!(scaled.shape(), data.shape());

        for column in scaled.columns() {
            assert_abs_diff_eq!(column.mean().unwrap(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(column.std(0.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_variance_column_becomes_zeros() {
        let data = array![[30.0, 1.0], [30.0, 2.0], [30.0, 3.0]];
        let scaled = StandardScaler::new().fit_transform(data.view()).unwrap();
        assert!(scaled.column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tiny_but_varying_column_is_scaled() {
        let data = array![[1e-17, 5.0], [2e-17, 6.0], [3e-17, 7.0]];
        let scaled = StandardScaler::new().fit_transform(data.view()).unwrap();
        for column in scaled.columns() {
            assert_abs_diff_eq!(column.std(0.0), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rounding_noise_counts_as_constant() {
        let data = array![[0.1], [0.1], [0.1], [0.1], [0.1], [0.1], [0.1]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(data.view()).unwrap();
        assert_eq!(scaler.scale().unwrap()[0], 1.0);
        for &v in scaled.iter() {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_inverse_transform_restores_input() {
        let data = array![[1.0, -2.0, 7.0], [4.0, 0.5, 7.0], [-3.0, 6.0, 7.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(data.view()).unwrap();
        let restored = scaler.inverse_transform(scaled.view()).unwrap();

        for (a, b) in restored.iter().zip(data.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transform_without_fit() {
        let data = array![[1.0, 2.0]];
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(data.view()),
            Err(AnalysisError::NotFitted(_))
        ));
    }

    #[test]
    fn test_transform_width_mismatch() {
        let mut scaler = StandardScaler::new();
        scaler.fit(array![[1.0, 2.0], [2.0, 3.0]].view()).unwrap();
        assert!(matches!(
            scaler.transform(array![[1.0, 2.0, 3.0]].view()),
            Err(AnalysisError::DimensionMismatch { .. })
        ));
    }
}
