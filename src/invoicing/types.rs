use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[default]
    Current,
    EmailSent,
    Overdue,
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 4] = [Self::Current, Self::EmailSent, Self::Overdue, Self::Paid];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::EmailSent => "EMAIL_SENT",
            Self::Overdue => "OVERDUE",
            Self::Paid => "PAID",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown invoice status: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentTerms {
    #[default]
    Days14,
    Days30,
    Days60,
}

impl PaymentTerms {
    pub const ALL: [PaymentTerms; 3] = [Self::Days14, Self::Days30, Self::Days60];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days14 => "14 days",
            Self::Days30 => "30 days",
            Self::Days60 => "60 days",
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Self::Days14 => 14,
            Self::Days30 => 30,
            Self::Days60 => 60,
        }
    }
}

impl fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentTerms {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|terms| terms.as_str() == s)
            .ok_or_else(|| format!("Unknown payment terms: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Currency {
    #[default]
    Ngn,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Self::Ngn, Self::Usd, Self::Eur, Self::Gbp];

    pub fn code(self) -> &'static str {
        match self {
            Self::Ngn => "NGN",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ngn => "Nigerian Naira",
            Self::Usd => "US Dollar",
            Self::Eur => "Euro",
            Self::Gbp => "British Pound",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| format!("Unknown currency: {s}"))
    }
}
