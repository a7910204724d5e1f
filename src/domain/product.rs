use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    GeneralHealth,
    MuscleGain,
    WeightLoss,
    WeightGain,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GeneralHealth => "GENERAL_HEALTH",
            Category::MuscleGain => "MUSCLE_GAIN",
            Category::WeightLoss => "WEIGHT_LOSS",
            Category::WeightGain => "WEIGHT_GAIN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::GeneralHealth => "General Health",
            Category::MuscleGain => "Muscle Gain",
            Category::WeightLoss => "Weight Loss",
            Category::WeightGain => "Weight Gain",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERAL_HEALTH" => Ok(Category::GeneralHealth),
            "MUSCLE_GAIN" => Ok(Category::MuscleGain),
            "WEIGHT_LOSS" => Ok(Category::WeightLoss),
            "WEIGHT_GAIN" => Ok(Category::WeightGain),
            other => Err(DomainError::InvalidInput(format!("unknown category {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: i32,
    pub category: Category,
    pub vendor: String,
    pub image: String,
}

/// Lowercase ASCII slug with every run of other characters collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_catalog_names() {
        assert_eq!(
            slugify("Gold Standard 100% Whey Protein Powder"),
            "gold-standard-100-whey-protein-powder"
        );
        assert_eq!(slugify("  Omega-3 Fish Oil  "), "omega-3-fish-oil");
        assert_eq!(slugify("B12 / Folate"), "b12-folate");
    }

    #[test]
    fn slug_of_symbols_only_is_empty() {
        assert_eq!(slugify("%%% ---"), "");
    }

    #[test]
    fn category_parses_storage_form() {
        assert_eq!("WEIGHT_GAIN".parse::<Category>().unwrap(), Category::WeightGain);
        assert!("VITAMINS".parse::<Category>().is_err());
        assert_eq!(Category::MuscleGain.label(), "Muscle Gain");
    }
}
