use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{Category, Product},
    error::AppError,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: i32,
    pub category: Category,
    pub vendor: String,
    pub image: String,
}

impl CreateProductRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Name is required".into()));
        }
        if self.vendor.trim().is_empty() {
            return Err(AppError::BadRequest("Vendor is required".into()));
        }
        if self.price.is_sign_negative() {
            return Err(AppError::BadRequest("Price must not be negative".into()));
        }
        if self.quantity < 0 {
            return Err(AppError::BadRequest("Quantity must not be negative".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub category: Option<Category>,
    pub vendor: Option<String>,
    pub image: Option<String>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::BadRequest("Name must not be empty".into()));
        }
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(AppError::BadRequest("Price must not be negative".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryAdjustRequest {
    pub delta: i32,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
