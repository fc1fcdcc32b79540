use askama::Result;
use rust_decimal::Decimal;
use std::fmt::Display;

// `{{ value|or_dash }}` renders an empty optional as a dash.
pub fn or_dash<T: Display>(value: &Option<T>) -> Result<String> {
    Ok(value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string()))
}

// `{{ price|money }}` always shows two decimal places.
pub fn money(value: &Decimal) -> Result<String> {
    Ok(format!("{:.2}", value.round_dp(2)))
}
