//! Listing submission and edit.
//!
//! A submission validates the listing and location sub-forms as a pair,
//! uploads the image (if any) to the object store, and persists the
//! Location and Listing rows in a single transaction, both or neither.
//! The upload always completes (or fails) before persistence begins, so a
//! Listing row never carries an unconfirmed image reference.

use chrono::Utc;
use common::storage::ObjectStorage;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{listing, location};
use crate::error::AppError;
use crate::extractors::auth::AuthSeller;
use crate::models::listing::{ListingFields, validate_listing_fields};
use crate::models::location::{LocationFields, validate_location_fields};
use crate::utils::filename::{listing_image_key, validate_upload_filename};

/// An image blob received with a submission.
pub struct NewImage {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Create a new listing with its location.
pub async fn submit(
    db: &DatabaseConnection,
    storage: &dyn ObjectStorage,
    seller: &AuthSeller,
    fields: ListingFields,
    location_fields: LocationFields,
    image: Option<NewImage>,
) -> Result<(listing::Model, location::Model), AppError> {
    // Both sub-forms must pass before any upload or persistence.
    validate_listing_fields(&fields)?;
    validate_location_fields(&location_fields)?;

    let uploaded = match image {
        Some(image) => Some(upload_image(storage, &seller.username, &image).await?),
        None => None,
    };
    let (image_url, image_key) = match uploaded {
        Some((url, key)) => (url, Some(key)),
        None => (String::new(), None),
    };

    let now = Utc::now();
    let result = async {
        let txn = db.begin().await?;

        let location_model = location::ActiveModel {
            address: Set(location_fields.address.trim().to_string()),
            city: Set(location_fields.city.trim().to_string()),
            state: Set(location_fields.state.trim().to_uppercase()),
            zip_code: Set(location_fields.zip_code.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let listing_model = listing::ActiveModel {
            id: Set(Uuid::new_v4()),
            seller_id: Set(seller.seller_id),
            location_id: Set(Some(location_model.id)),
            brand: Set(fields.brand.trim().to_string()),
            model: Set(fields.model.trim().to_string()),
            vin: Set(fields.vin.trim().to_string()),
            mileage: Set(fields.mileage),
            color: Set(fields.color.trim().to_string()),
            description: Set(fields.description.trim().to_string()),
            engine: Set(fields.engine.trim().to_string()),
            transmission: Set(fields.transmission.trim().to_string()),
            image: Set(image_url),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok((listing_model, location_model))
    }
    .await;

    if result.is_err()
        && let Some(key) = image_key
    {
        // Best effort: don't leave an object no row references.
        storage.delete(&key).await;
    }

    result
}

/// Edit an existing listing and its location by identifier.
///
/// Full-replace semantics over the same two sub-forms as [`submit`]. A
/// missing new image retains the stored address unchanged. The listing row
/// is locked for the duration of the transaction; across transactions the
/// last writer wins.
pub async fn edit(
    db: &DatabaseConnection,
    storage: &dyn ObjectStorage,
    seller: &AuthSeller,
    listing_id: Uuid,
    fields: ListingFields,
    location_fields: LocationFields,
    image: Option<NewImage>,
) -> Result<(listing::Model, location::Model), AppError> {
    validate_listing_fields(&fields)?;
    validate_location_fields(&location_fields)?;

    // Resolve before uploading so an unknown id performs no storage calls.
    let existing = find_listing(db, listing_id).await?;
    if existing.seller_id != seller.seller_id {
        return Err(AppError::PermissionDenied);
    }

    let uploaded = match image {
        Some(image) => Some(upload_image(storage, &seller.username, &image).await?),
        None => None,
    };
    let image_url = match &uploaded {
        Some((url, _)) => url.clone(),
        None => existing.image.clone(),
    };

    let now = Utc::now();
    let result = async {
        let txn = db.begin().await?;

        let current = listing::Entity::find_by_id(listing_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".into()))?;

        // The location may have been deleted since creation; recreate it.
        let location_model = match current.location_id {
            Some(location_id) => {
                let loc = location::Entity::find_by_id(location_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::Internal("location row missing".into()))?;
                let mut active: location::ActiveModel = loc.into();
                active.address = Set(location_fields.address.trim().to_string());
                active.city = Set(location_fields.city.trim().to_string());
                active.state = Set(location_fields.state.trim().to_uppercase());
                active.zip_code = Set(location_fields.zip_code.trim().to_string());
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                location::ActiveModel {
                    address: Set(location_fields.address.trim().to_string()),
                    city: Set(location_fields.city.trim().to_string()),
                    state: Set(location_fields.state.trim().to_uppercase()),
                    zip_code: Set(location_fields.zip_code.trim().to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        let mut active: listing::ActiveModel = current.into();
        active.location_id = Set(Some(location_model.id));
        active.brand = Set(fields.brand.trim().to_string());
        active.model = Set(fields.model.trim().to_string());
        active.vin = Set(fields.vin.trim().to_string());
        active.mileage = Set(fields.mileage);
        active.color = Set(fields.color.trim().to_string());
        active.description = Set(fields.description.trim().to_string());
        active.engine = Set(fields.engine.trim().to_string());
        active.transmission = Set(fields.transmission.trim().to_string());
        active.image = Set(image_url);
        active.updated_at = Set(now);
        let listing_model = active.update(&txn).await?;

        txn.commit().await?;
        Ok((listing_model, location_model))
    }
    .await;

    // Same rule as submit, except the object stays when the stored
    // reference already points at it (re-upload of the same filename).
    if result.is_err()
        && let Some((url, key)) = uploaded
        && url != existing.image
    {
        storage.delete(&key).await;
    }

    result
}

pub async fn find_listing<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<listing::Model, AppError> {
    listing::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))
}

/// Validate the filename, build the storage key, and upload.
///
/// Returns the public URL and the key it was stored under. An upload
/// failure aborts the enclosing workflow; no rows are written for a
/// listing whose image was never confirmed.
async fn upload_image(
    storage: &dyn ObjectStorage,
    username: &str,
    image: &NewImage,
) -> Result<(String, String), AppError> {
    let filename = validate_upload_filename(&image.filename)
        .map_err(|e| AppError::Validation(e.message().into()))?;

    // Browsers don't always set a content type on the file part.
    let content_type = match image.content_type.as_deref() {
        Some(ct) => Some(ct.to_string()),
        None => mime_guess::from_path(filename)
            .first_raw()
            .map(str::to_string),
    };

    let key = listing_image_key(username, filename);
    let url = storage
        .put(&key, &image.data, content_type.as_deref())
        .await?;

    Ok((url, key))
}
