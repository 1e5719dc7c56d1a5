//! Payload types of the Domino REST API.

use rust_decimal::Decimal;
use serde::Deserialize;

/// A record category the sync can pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCategory {
    Jobs,
    Leads,
    Shops,
}

impl std::fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jobs => write!(f, "jobs"),
            Self::Leads => write!(f, "leads"),
            Self::Shops => write!(f, "shops"),
        }
    }
}

/// List envelope returned by Domino's collection endpoints.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

/// A job posting as Domino serves it.
#[derive(Debug, Clone, Deserialize)]
pub struct DominoJob {
    /// Domino-side ID.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub hourly_wage: Option<Decimal>,
    pub status: String,
}

/// A candidate lead as Domino serves it.
#[derive(Debug, Clone, Deserialize)]
pub struct DominoLead {
    /// Domino-side ID.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub status: String,
}

/// A shop record as Domino serves it.
#[derive(Debug, Clone, Deserialize)]
pub struct DominoShop {
    /// Domino-side ID.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub status: String,
}
