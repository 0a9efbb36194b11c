use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::not_blank;

/// Stored country row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
}

/// Flat transfer representation of a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDto {
    pub id: i64,
    pub name: String,
}

impl From<&Country> for CountryDto {
    fn from(country: &Country) -> Self {
        Self {
            id: country.id,
            name: country.name.clone(),
        }
    }
}

/// Request body for creating or replacing a country.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CountryPayload {
    /// Ignored on create; must equal the path id on update
    #[serde(default)]
    pub id: i64,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "cannot be more than 50 characters")
    )]
    pub name: String,
}

impl From<CountryPayload> for Country {
    fn from(payload: CountryPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
        }
    }
}
