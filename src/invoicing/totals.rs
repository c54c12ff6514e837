use bigdecimal::num_bigint::Sign;
use bigdecimal::{BigDecimal, RoundingMode, Zero};

use super::storage::DbProduct;

/// Exact sum of `quantity * price` over the line items.
pub fn invoice_total(products: &[DbProduct]) -> BigDecimal {
    products
        .iter()
        .fold(BigDecimal::zero(), |acc, p| acc + &p.quantity * &p.price)
}

pub fn line_total(product: &DbProduct) -> BigDecimal {
    &product.quantity * &product.price
}

/// Two decimal places, e.g. `1234.50` or `0.00`. Half-even rounding.
pub fn format_total(amount: &BigDecimal) -> String {
    let (cents, _) = amount
        .with_scale_round(2, RoundingMode::HalfEven)
        .into_bigint_and_exponent();
    let sign = if cents.sign() == Sign::Minus { "-" } else { "" };
    let digits = format!("{:0>3}", cents.magnitude().to_string());
    let (units, fraction) = digits.split_at(digits.len() - 2);
    format!("{sign}{units}.{fraction}")
}

/// Currency shown for the invoice: that of the last line item carrying one.
pub fn invoice_currency(products: &[DbProduct]) -> Option<&str> {
    products
        .iter()
        .rev()
        .map(|p| p.currency.as_str())
        .find(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn product(quantity: &str, price: &str, currency: &str) -> DbProduct {
        let now = Utc::now();
        DbProduct {
            id: Uuid::new_v4(),
            invoice_id: Uuid::nil(),
            title: Some("Item".into()),
            description: None,
            quantity: BigDecimal::from_str(quantity).expect("quantity"),
            price: BigDecimal::from_str(price).expect("price"),
            currency: currency.into(),
            unique_id: "000000000000".into(),
            slug: "item-000000000000".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_total_of_no_products_is_zero() {
        assert_eq!(format_total(&invoice_total(&[])), "0.00");
        assert_eq!(invoice_currency(&[]), None);
    }

    #[test]
    fn test_format_keeps_two_places() {
        let cases = [
            ("0", "0.00"),
            ("0.00", "0.00"),
            ("0.001", "0.00"),
            ("-0.001", "0.00"),
            ("0.5", "0.50"),
            ("100", "100.00"),
            ("0.015", "0.02"),
            ("0.025", "0.02"),
            ("-12.345", "-12.34"),
            ("1234567.891", "1234567.89"),
        ];
        for (input, expected) in cases {
            let amount = BigDecimal::from_str(input).expect("decimal");
            assert_eq!(format_total(&amount), expected, "{input}");
        }
    }

    #[test]
    fn test_total_sums_lines_exactly() {
        let products = vec![
            product("2.5", "100.10", "USD"),
            product("3", "19.99", "USD"),
            product("0.1", "0.20", "USD"),
        ];
        let total = invoice_total(&products);
        assert_eq!(total, BigDecimal::from_str("310.24").expect("decimal"));
        assert_eq!(format_total(&total), "310.24");
    }

    #[test]
    fn test_format_pads_whole_numbers() {
        let products = vec![product("4", "25", "NGN")];
        assert_eq!(format_total(&invoice_total(&products)), "100.00");
        assert_eq!(format_total(&line_total(&products[0])), "100.00");
    }

    #[test]
    fn test_currency_is_last_product_with_one() {
        let products = vec![
            product("1", "1", "NGN"),
            product("1", "1", "EUR"),
            product("1", "1", ""),
        ];
        assert_eq!(invoice_currency(&products), Some("EUR"));
    }
}
