use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::location;
use crate::error::AppError;

/// The location sub-form of a listing submission. Validated independently
/// of the listing fields; both must pass before anything is persisted.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct LocationFields {
    #[schema(example = "1600 Grand Ave")]
    pub address: String,
    #[schema(example = "Saint Paul")]
    pub city: String,
    /// Two-letter state code.
    #[schema(example = "MN")]
    pub state: String,
    /// Five-digit ZIP or ZIP+4.
    #[schema(example = "55105")]
    pub zip_code: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LocationResponse {
    pub id: i32,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<location::Model> for LocationResponse {
    fn from(m: location::Model) -> Self {
        Self {
            id: m.id,
            address: m.address,
            city: m.city,
            state: m.state,
            zip_code: m.zip_code,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_location_fields(fields: &LocationFields) -> Result<(), AppError> {
    let address = fields.address.trim();
    if address.is_empty() || address.chars().count() > 128 {
        return Err(AppError::Validation(
            "address must be 1-128 characters".into(),
        ));
    }

    let city = fields.city.trim();
    if city.is_empty() || city.chars().count() > 64 {
        return Err(AppError::Validation("city must be 1-64 characters".into()));
    }

    let state = fields.state.trim();
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(
            "state must be a two-letter code".into(),
        ));
    }

    if !is_valid_zip(fields.zip_code.trim()) {
        return Err(AppError::Validation(
            "zip_code must be a 5-digit ZIP or ZIP+4".into(),
        ));
    }

    Ok(())
}

/// `12345` or `12345-6789`.
fn is_valid_zip(zip: &str) -> bool {
    let (head, tail) = match zip.split_once('-') {
        Some((head, tail)) => (head, Some(tail)),
        None => (zip, None),
    };
    let head_ok = head.len() == 5 && head.chars().all(|c| c.is_ascii_digit());
    let tail_ok = match tail {
        Some(t) => t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()),
        None => true,
    };
    head_ok && tail_ok
}
