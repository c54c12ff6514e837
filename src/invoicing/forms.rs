//! Form bodies posted by the HTML pages and their checked counterparts.

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::shared::utils::non_empty;

use super::error::InvoicingError;
use super::types::{Currency, InvoiceStatus, PaymentTerms};

#[derive(Debug, Default)]
struct Problems(Vec<String>);

impl Problems {
    fn push(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    fn finish<T>(self, value: T) -> Result<T, InvoicingError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(InvoicingError::Validation(self.0.join("; ")))
        }
    }
}

fn bounded(
    problems: &mut Problems,
    label: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    let value = non_empty(value);
    if let Some(v) = &value {
        if v.chars().count() > max {
            problems.push(format!("{label} must be at most {max} characters"));
        }
    }
    value
}

fn required(problems: &mut Problems, label: &str, value: String, max: usize) -> String {
    let value = value.trim().to_string();
    if value.is_empty() {
        problems.push(format!("{label} is required"));
    } else if value.chars().count() > max {
        problems.push(format!("{label} must be at most {max} characters"));
    }
    value
}

fn country_code(problems: &mut Problems, value: Option<String>) -> Option<String> {
    let value = non_empty(value)?.to_ascii_uppercase();
    if value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(value)
    } else {
        problems.push("Country must be a two-letter ISO 3166 code");
        None
    }
}

fn email_address(problems: &mut Problems, value: Option<String>) -> Option<String> {
    let value = non_empty(value)?;
    if value.len() > 100 {
        problems.push("Email address must be at most 100 characters");
    } else if lettre::Address::from_str(&value).is_err() {
        problems.push("Enter a valid email address");
    }
    Some(value)
}

/// Digits allowed before the decimal point for stored amounts.
pub const MAX_INTEGER_DIGITS: u32 = 10;
pub const QUANTITY_PLACES: i64 = 4;
pub const PRICE_PLACES: i64 = 2;

/// A non-negative amount that fits its `NUMERIC` column without rounding.
fn amount(problems: &mut Problems, label: &str, value: &str, places: i64) -> BigDecimal {
    let d = match BigDecimal::from_str(value.trim()) {
        Ok(d) => d,
        Err(_) => {
            problems.push(format!("{label} must be a number"));
            return BigDecimal::zero();
        }
    };

    if d < BigDecimal::zero() {
        problems.push(format!("{label} cannot be negative"));
    }
    if d.abs() >= BigDecimal::from(10_u64.pow(MAX_INTEGER_DIGITS)) {
        problems.push(format!(
            "{label} must have at most {MAX_INTEGER_DIGITS} digits before the decimal point"
        ));
    } else {
        let (_, scale) = d.normalized().as_bigint_and_exponent();
        if scale > places {
            problems.push(format!("{label} can have at most {places} decimal places"));
        }
    }
    d
}

fn choice<T: FromStr + Default>(problems: &mut Problems, label: &str, value: Option<String>) -> T {
    match non_empty(value) {
        None => T::default(),
        Some(v) => v.parse().unwrap_or_else(|_| {
            problems.push(format!("Select a valid {label}"));
            T::default()
        }),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientForm {
    pub client_name: Option<String>,
    pub address_line1: Option<String>,
    pub country: Option<String>,
    pub state_or_province: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub tax_number: Option<String>,
}

/// Postal details shared by clients and company settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartyDetails {
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub country: Option<String>,
    pub state_or_province: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub tax_number: Option<String>,
}

impl ClientForm {
    pub fn validate(self) -> Result<PartyDetails, InvoicingError> {
        let mut p = Problems::default();
        let details = PartyDetails {
            name: bounded(&mut p, "Client name", self.client_name, 200),
            address_line1: bounded(&mut p, "Address", self.address_line1, 200),
            country: country_code(&mut p, self.country),
            state_or_province: bounded(&mut p, "State or province", self.state_or_province, 100),
            postal_code: bounded(&mut p, "Postal code", self.postal_code, 20),
            phone_number: bounded(&mut p, "Phone number", self.phone_number, 20),
            email_address: email_address(&mut p, self.email_address),
            tax_number: bounded(&mut p, "Tax number", self.tax_number, 100),
        };
        p.finish(details)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    pub company_name: Option<String>,
    pub address_line1: Option<String>,
    pub country: Option<String>,
    pub state_or_province: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub tax_number: Option<String>,
}

impl SettingsForm {
    pub fn validate(self) -> Result<PartyDetails, InvoicingError> {
        ClientForm {
            client_name: self.company_name,
            address_line1: self.address_line1,
            country: self.country,
            state_or_province: self.state_or_province,
            postal_code: self.postal_code,
            phone_number: self.phone_number,
            email_address: self.email_address,
            tax_number: self.tax_number,
        }
        .validate()
        .map_err(|e| match e {
            InvoicingError::Validation(msg) => {
                InvoicingError::Validation(msg.replace("Client name", "Company name"))
            }
            other => other,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub price: String,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub quantity: BigDecimal,
    pub price: BigDecimal,
    pub currency: Currency,
}

impl ProductForm {
    pub fn validate(self) -> Result<ProductInput, InvoicingError> {
        let mut p = Problems::default();
        let input = ProductInput {
            title: bounded(&mut p, "Title", self.title, 100),
            description: non_empty(self.description),
            quantity: amount(&mut p, "Quantity", &self.quantity, QUANTITY_PLACES),
            price: amount(&mut p, "Price", &self.price, PRICE_PLACES),
            currency: choice(&mut p, "currency", self.currency),
        };
        p.finish(input)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceDetailsForm {
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub payment_terms: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetails {
    pub title: Option<String>,
    pub due_date: NaiveDate,
    pub payment_terms: PaymentTerms,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
}

impl InvoiceDetailsForm {
    /// `today` anchors the due date when the form leaves it empty.
    pub fn validate(self, today: NaiveDate) -> Result<InvoiceDetails, InvoicingError> {
        let mut p = Problems::default();
        let title = bounded(&mut p, "Title", self.title, 100);
        let payment_terms: PaymentTerms = choice(&mut p, "payment term", self.payment_terms);
        let status: InvoiceStatus = choice(&mut p, "status", self.status);
        let due_date = match non_empty(self.due_date) {
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").unwrap_or_else(|_| {
                p.push("Due date must be formatted YYYY-MM-DD");
                today
            }),
            None => today + chrono::Duration::days(payment_terms.days()),
        };
        p.finish(InvoiceDetails {
            title,
            due_date,
            payment_terms,
            status,
            notes: non_empty(self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientSelectForm {
    pub client: Option<String>,
}

impl ClientSelectForm {
    /// Returns the slug of the chosen client.
    pub fn validate(self) -> Result<String, InvoicingError> {
        non_empty(self.client).ok_or_else(|| InvoicingError::Validation("Select a client".into()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BankDetailForm {
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_number: String,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankDetailInput {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub currency: Currency,
}

impl BankDetailForm {
    pub fn validate(self) -> Result<BankDetailInput, InvoicingError> {
        let mut p = Problems::default();
        let input = BankDetailInput {
            bank_name: required(&mut p, "Bank name", self.bank_name, 200),
            account_name: required(&mut p, "Account name", self.account_name, 200),
            account_number: required(&mut p, "Account number", self.account_number, 50),
            currency: match non_empty(self.currency) {
                Some(c) => c.parse().unwrap_or_else(|_| {
                    p.push("Select a valid currency");
                    Currency::default()
                }),
                None => {
                    p.push("Currency is required");
                    Currency::default()
                }
            },
        };
        p.finish(input)
    }
}
