use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::FormError;

/// 發票表單目前的欄位值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    pub tax_id: String,
    pub company_name: String,
    pub city: String,
    pub street: String,
    pub unit_price: f64,
    pub quantity: f64,
}

/// 公司目錄回傳的紀錄，只讀
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Company {
    pub tax_id: String,
    pub company_name: String,
    pub city: String,
    pub street: String,
    /// 格式不符 RFC 3339 時為 `None`，不影響整筆紀錄
    #[serde(rename = "createdAt", default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub id: String,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|timestamp| timestamp.with_timezone(&Utc)))
}

/// 送出時交給 sink 的完整紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub tax_id: String,
    pub company_name: String,
    pub city: String,
    pub street: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub price_gross: String,
}

impl InvoiceRecord {
    pub fn new(data: FormData, price_gross: String) -> Self {
        Self {
            tax_id: data.tax_id,
            company_name: data.company_name,
            city: data.city,
            street: data.street,
            unit_price: data.unit_price,
            quantity: data.quantity,
            price_gross,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    TaxId,
    CompanyName,
    City,
    Street,
    UnitPrice,
    Quantity,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::TaxId,
        FormField::CompanyName,
        FormField::City,
        FormField::Street,
        FormField::UnitPrice,
        FormField::Quantity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormField::TaxId => "tax_id",
            FormField::CompanyName => "company_name",
            FormField::City => "city",
            FormField::Street => "street",
            FormField::UnitPrice => "unit_price",
            FormField::Quantity => "quantity",
        }
    }

}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| FormError::Command {
                input: s.to_string(),
                reason: "unknown field".to_string(),
            })
    }
}
