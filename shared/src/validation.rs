//! Validation utilities for the Neighborhood Market platform

use rust_decimal::Decimal;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Largest catalog price, the bound of a `NUMERIC(12, 2)` column
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Largest quantity on one order line
pub const MAX_QUANTITY: i32 = 10_000;

/// Validate a review rating (1 to 5 stars)
pub fn validate_rating(rating: i32) -> Result<(), &'static str> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err("Rating must be between 1 and 5");
    }
    Ok(())
}

/// Validate a catalog price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("Price cannot be negative");
    }
    if price > MAX_PRICE {
        return Err("Price cannot exceed 9999999999.99");
    }
    if price.normalize().scale() > 2 {
        return Err("Price cannot have more than two decimal places");
    }
    Ok(())
}

/// Validate an order line quantity
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity cannot exceed 10000");
    }
    Ok(())
}

/// Validate that free text carries at least one visible character
pub fn validate_not_blank(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value cannot be blank");
    }
    Ok(())
}

/// Parse a distance radius such as `"200m"`, `"500 m"` or `"350"` into meters
pub fn parse_distance_radius(raw: &str) -> Result<f64, &'static str> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('m').unwrap_or(trimmed).trim();

    let meters: f64 = number
        .parse()
        .map_err(|_| "Distance must look like \"200m\" or \"500m\"")?;

    if !meters.is_finite() || meters < 0.0 {
        return Err("Distance must be a non-negative number of meters");
    }
    Ok(meters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_rating_bounds() {
        for rating in 1..=5 {
            assert!(validate_rating(rating).is_ok());
        }
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::from_str("120.00").unwrap()).is_ok());
        assert!(validate_price(Decimal::from_str("-0.01").unwrap()).is_err());
    }

    #[test]
    fn test_validate_price_fits_storage() {
        assert_eq!(MAX_PRICE, Decimal::from_str("9999999999.99").unwrap());
        assert!(validate_price(MAX_PRICE).is_ok());
        assert!(validate_price(Decimal::from_str("10000000000.00").unwrap()).is_err());
        assert!(validate_price(Decimal::MAX).is_err());
        assert!(validate_price(Decimal::from_str("1.005").unwrap()).is_err());
        assert!(validate_price(Decimal::from_str("1.500").unwrap()).is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Kitchen").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_parse_distance_radius() {
        assert_eq!(parse_distance_radius("200m"), Ok(200.0));
        assert_eq!(parse_distance_radius("500 m"), Ok(500.0));
        assert_eq!(parse_distance_radius(" 350 "), Ok(350.0));
        assert!(parse_distance_radius("far").is_err());
        assert!(parse_distance_radius("-5m").is_err());
        assert!(parse_distance_radius("").is_err());
    }
}
