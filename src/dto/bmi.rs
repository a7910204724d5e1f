use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Category, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBmiRequest {
    /// Metres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: Category,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Recommendations {
    pub bmi: Option<f64>,
    pub category: Option<Category>,
    pub products: Vec<Product>,
}
