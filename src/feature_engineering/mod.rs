//! Feature creation stages
//!
//! Stages that derive new columns ([`PolynomialFeatures`]) or rescale the
//! preprocessed matrix ([`Scaler`] as MinMax/MaxAbs).

mod polynomial;

pub use polynomial::{PolynomialFeatures, MAX_DEGREE};

use crate::error::Result;
use crate::pipeline::PipelineStage;
use crate::preprocessing::Scaler;
use ndarray::{Array1, Array2};
use serde_json::json;

impl PipelineStage for Scaler {
    fn name(&self) -> &'static str {
        self.scaler_type().name()
    }

    fn fit(&mut self, x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
        Scaler::fit(self, x).map(|_| ())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        Scaler::transform(self, x)
    }

    fn params(&self) -> serde_json::Value {
        json!({})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ScalerType;
    use ndarray::array;

    #[test]
    fn test_scaler_as_stage() {
        let x = array![[0.0, -2.0], [5.0, 1.0], [10.0, -0.5]];
        let y = Array1::zeros(3);
        let mut stage: Box<dyn PipelineStage> = Box::new(Scaler::new(ScalerType::MinMax));
        let out = stage.fit_transform(&x, &y).unwrap();

        assert_eq!(stage.name(), "MinMaxScaler");
        assert_eq!(out.column(0).to_vec(), vec![0.0, 0.5, 1.0]);
        assert_eq!(out.column(1).to_vec(), vec![0.0, 1.0, 0.5]);
    }
}
