use crate::domain::model::FormData;
use crate::utils::error::{FormError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// 街道格式：門牌號碼 + 至少一個單字，整串比對
static STREET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+\s+[0-9A-Za-z_]+(\s+[0-9A-Za-z_]+)*$").expect("street pattern compiles")
});

const STEP_TOLERANCE: f64 = 1e-9;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FormError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FormError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(FormError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(FormError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

fn validate_required(field_name: &str, value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FormError::validation(field_name, message));
    }
    Ok(())
}

pub fn validate_street(value: &str) -> Result<()> {
    validate_required("street", value, "Please enter street name")?;
    if !STREET_PATTERN.is_match(value) {
        return Err(FormError::validation(
            "street",
            "Please enter a valid street name",
        ));
    }
    Ok(())
}

/// 數值欄位：非負，且必須落在 `step` 的整數倍上
pub fn validate_stepped_number(
    field_name: &str,
    value: f64,
    step: f64,
    step_message: &str,
) -> Result<()> {
    if !value.is_finite() {
        return Err(FormError::validation(field_name, "Please enter a number"));
    }
    if value < 0.0 {
        return Err(FormError::validation(
            field_name,
            "Value must be greater than or equal to 0",
        ));
    }
    let steps = value / step;
    if (steps - steps.round()).abs() > STEP_TOLERANCE * steps.abs().max(1.0) {
        return Err(FormError::validation(field_name, step_message));
    }
    Ok(())
}

/// 送出前的欄位檢查，依欄位順序回傳第一個錯誤
pub fn validate_form(data: &FormData) -> Result<()> {
    validate_required("tax_id", &data.tax_id, "Please enter the tax ID")?;
    validate_required(
        "company_name",
        &data.company_name,
        "Please enter the company name",
    )?;
    validate_required("city", &data.city, "Please enter city name")?;
    validate_street(&data.street)?;
    validate_stepped_number(
        "unit_price",
        data.unit_price,
        0.01,
        "Price can have at most two decimals",
    )?;
    validate_stepped_number("quantity", data.quantity, 1.0, "Quantity must be a whole number")?;
    Ok(())
}
