//! Data preprocessing module
//!
//! Provides the column-group preprocessing applied ahead of every model:
//! - Missing value imputation
//! - Feature scaling (StandardScaler, MinMaxScaler, MaxAbsScaler)
//! - One-hot categorical encoding

mod column_transformer;
mod encoder;
mod imputer;
mod scaler;

pub use column_transformer::ColumnTransformer;
pub use encoder::{OneHotEncoder, MISSING_CATEGORY};
pub use imputer::{ImputeStrategy, SimpleImputer};
pub use scaler::{Scaler, ScalerType};
