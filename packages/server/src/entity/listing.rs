use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed set of accepted vehicle brands.
pub const ALLOWED_BRANDS: &[&str] = &[
    "Toyota",
    "Honda",
    "Ford",
    "Chevrolet",
    "BMW",
    "Mercedes-Benz",
    "Audi",
    "Volkswagen",
    "Nissan",
    "Hyundai",
    "Kia",
    "Mazda",
    "Subaru",
    "Lexus",
    "Tesla",
];

/// Closed set of accepted transmission options.
pub const ALLOWED_TRANSMISSIONS: &[&str] = &["Automatic", "Manual", "CVT"];

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing")]
pub struct Model {
    /// UUIDv4 primary key, assigned at creation and immutable.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub seller_id: i32,

    #[sea_orm(belongs_to, from = "seller_id", to = "id")]
    pub seller: BelongsTo<super::seller::Entity>,

    /// Nullable: the location may be deleted out from under a listing,
    /// but is always set when created through the submission workflow.
    pub location_id: Option<i32>,

    #[sea_orm(belongs_to, from = "location_id", to = "id")]
    pub location: BelongsTo<Option<super::location::Entity>>,

    /// One of [`ALLOWED_BRANDS`].
    pub brand: String,
    pub model: String,
    /// Stored as-is, no checksum validation.
    pub vin: String,
    pub mileage: i32,
    pub color: String,
    pub description: String,
    pub engine: String,
    /// One of [`ALLOWED_TRANSMISSIONS`].
    pub transmission: String,

    /// Public URL of the image in the object store. Never raw bytes;
    /// written only after a confirmed successful upload.
    pub image: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
