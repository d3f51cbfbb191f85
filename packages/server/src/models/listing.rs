use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::listing::{ALLOWED_BRANDS, ALLOWED_TRANSMISSIONS};
use crate::entity::{listing, location};
use crate::error::AppError;

use super::location::LocationResponse;
pub use super::shared::{Pagination, escape_like};

fn default_color() -> String {
    "White".to_string()
}

/// The listing sub-form of a submission. Paired with
/// [`super::location::LocationFields`]; both are validated before any
/// upload or persistence happens.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ListingFields {
    /// One of the supported brands.
    #[schema(example = "Toyota")]
    pub brand: String,
    #[schema(example = "Corolla")]
    pub model: String,
    /// Stored as-is; no checksum validation.
    #[schema(example = "JTBC123")]
    pub vin: String,
    #[serde(default)]
    #[schema(example = 5000)]
    pub mileage: i32,
    #[serde(default = "default_color")]
    #[schema(example = "Black")]
    pub color: String,
    pub description: String,
    #[schema(example = "1.8L")]
    pub engine: String,
    /// One of the supported transmission options.
    #[schema(example = "Automatic")]
    pub transmission: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ListingResponse {
    pub id: Uuid,
    pub seller_id: i32,
    pub brand: String,
    pub model: String,
    pub vin: String,
    pub mileage: i32,
    pub color: String,
    pub description: String,
    pub engine: String,
    pub transmission: String,
    /// Public URL of the stored image; empty if no image was uploaded.
    pub image: String,
    pub location: Option<LocationResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingResponse {
    pub fn from_parts(listing: listing::Model, location: Option<location::Model>) -> Self {
        Self {
            id: listing.id,
            seller_id: listing.seller_id,
            brand: listing.brand,
            model: listing.model,
            vin: listing.vin,
            mileage: listing.mileage,
            color: listing.color,
            description: listing.description,
            engine: listing.engine,
            transmission: listing.transmission,
            image: listing.image,
            location: location.map(LocationResponse::from),
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

impl From<listing::Model> for ListingResponse {
    fn from(m: listing::Model) -> Self {
        Self::from_parts(m, None)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ListingListResponse {
    pub data: Vec<ListingResponse>,
    pub pagination: Pagination,
}

/// Attribute filters for browsing listings. Unset criteria impose no
/// constraint.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ListingListQuery {
    /// Exact brand match.
    pub brand: Option<String>,
    /// Case-insensitive model substring.
    pub model: Option<String>,
    pub mileage_min: Option<i32>,
    pub mileage_max: Option<i32>,
    /// Exact color match.
    pub color: Option<String>,
    /// Exact transmission match.
    pub transmission: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Outcome of an inquiry dispatch, mirrored to the client verbatim.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EnquiryResponse {
    pub success: bool,
    pub message: String,
}

pub fn validate_listing_fields(fields: &ListingFields) -> Result<(), AppError> {
    let brand = fields.brand.trim();
    if !ALLOWED_BRANDS.contains(&brand) {
        return Err(AppError::Validation(format!(
            "brand must be one of: {}",
            ALLOWED_BRANDS.join(", ")
        )));
    }

    let model = fields.model.trim();
    if model.is_empty() || model.chars().count() > 64 {
        return Err(AppError::Validation("model must be 1-64 characters".into()));
    }

    let vin = fields.vin.trim();
    if vin.is_empty() || vin.chars().count() > 18 {
        return Err(AppError::Validation("vin must be 1-18 characters".into()));
    }

    if fields.mileage < 0 {
        return Err(AppError::Validation("mileage must be >= 0".into()));
    }

    let color = fields.color.trim();
    if color.is_empty() || color.chars().count() > 24 {
        return Err(AppError::Validation("color must be 1-24 characters".into()));
    }

    if fields.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".into()));
    }

    let engine = fields.engine.trim();
    if engine.is_empty() || engine.chars().count() > 24 {
        return Err(AppError::Validation(
            "engine must be 1-24 characters".into(),
        ));
    }

    let transmission = fields.transmission.trim();
    if !ALLOWED_TRANSMISSIONS.contains(&transmission) {
        return Err(AppError::Validation(format!(
            "transmission must be one of: {}",
            ALLOWED_TRANSMISSIONS.join(", ")
        )));
    }

    Ok(())
}
