use super::{errors::DomainError, product::Category};

pub const UNDERWEIGHT_BELOW: f64 = 18.5;
pub const OVERWEIGHT_FROM: f64 = 25.0;

/// Body-mass index from height in metres and weight in kilograms.
pub fn compute_bmi(height_m: f64, weight_kg: f64) -> Result<f64, DomainError> {
    if !height_m.is_finite() || height_m <= 0.0 {
        return Err(DomainError::InvalidInput("height must be positive".into()));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(DomainError::InvalidInput("weight must be positive".into()));
    }
    Ok(weight_kg / (height_m * height_m))
}

pub fn recommended_category(bmi: f64) -> Category {
    if bmi < UNDERWEIGHT_BELOW {
        Category::WeightGain
    } else if bmi < OVERWEIGHT_FROM {
        Category::MuscleGain
    } else {
        Category::WeightLoss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_formula() {
        let bmi = compute_bmi(1.80, 81.0).unwrap();
        assert!((bmi - 25.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_measurements() {
        assert!(compute_bmi(0.0, 70.0).is_err());
        assert!(compute_bmi(1.7, -1.0).is_err());
        assert!(compute_bmi(f64::NAN, 70.0).is_err());
    }

    #[test]
    fn category_boundaries() {
        assert_eq!(recommended_category(18.49), Category::WeightGain);
        assert_eq!(recommended_category(18.5), Category::MuscleGain);
        assert_eq!(recommended_category(24.99), Category::MuscleGain);
        assert_eq!(recommended_category(25.0), Category::WeightLoss);
    }
}
