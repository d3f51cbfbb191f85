//! Listing CRUD, browsing, and enquiries.

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{listing, location};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthSeller;
use crate::models::listing::{
    EnquiryResponse, ListingFields, ListingListQuery, ListingListResponse, ListingResponse,
    Pagination, escape_like,
};
use crate::models::location::LocationFields;
use crate::state::AppState;
use crate::workflows::submission::NewImage;
use crate::workflows::{enquiry, submission};

/// Body limit layer for the multipart submission routes (16MB).
pub fn submission_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(16 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Listings",
    operation_id = "createListing",
    summary = "Submit a new listing",
    description = "Creates a listing together with its location. Text parts carry the listing \
        and location fields; an optional `image` file part is uploaded to object storage before \
        anything is persisted. The Location and Listing rows are written in one transaction.",
    request_body(content_type = "multipart/form-data", description = "Listing and location fields plus optional image"),
    responses(
        (status = 201, description = "Listing created", body = ListingResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Image upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, seller, multipart), fields(username = %seller.username))]
pub async fn create_listing(
    seller: AuthSeller,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (fields, location_fields, image) = parse_listing_form(multipart).await?;

    let (listing, location) = submission::submit(
        &state.db,
        state.storage.as_ref(),
        &seller,
        fields,
        location_fields,
        image,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ListingResponse::from_parts(listing, Some(location))),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Listings",
    operation_id = "listListings",
    summary = "Browse listings",
    description = "Returns listings newest first. All filters are optional and combine \
        conjunctively; an unset filter imposes no constraint.",
    params(ListingListQuery),
    responses(
        (status = 200, description = "Page of listings", body = ListingListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingListQuery>,
) -> Result<Json<ListingListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = listing::Entity::find();

    if let Some(ref brand) = query.brand {
        select = select.filter(listing::Column::Brand.eq(brand.trim()));
    }

    if let Some(ref model) = query.model {
        let term = escape_like(model.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(listing::Column::Model)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    // An inverted mileage range matches nothing rather than erroring.
    if let Some(min) = query.mileage_min {
        select = select.filter(listing::Column::Mileage.gte(min));
    }
    if let Some(max) = query.mileage_max {
        select = select.filter(listing::Column::Mileage.lte(max));
    }

    if let Some(ref color) = query.color {
        select = select.filter(listing::Column::Color.eq(color.trim()));
    }

    if let Some(ref transmission) = query.transmission {
        select = select.filter(listing::Column::Transmission.eq(transmission.trim()));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    // The id tiebreaker keeps pages disjoint when timestamps collide.
    let rows = select
        .order_by(listing::Column::CreatedAt, Order::Desc)
        .order_by(listing::Column::Id, Order::Desc)
        .find_also_related(location::Entity)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .map(|(listing, location)| ListingResponse::from_parts(listing, location))
        .collect();

    Ok(Json(ListingListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Listings",
    operation_id = "getListing",
    summary = "Get a listing by ID",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "The listing", body = ListingResponse),
        (status = 404, description = "Listing not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingResponse>, AppError> {
    let (listing, location) = listing::Entity::find_by_id(id)
        .find_also_related(location::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))?;

    Ok(Json(ListingResponse::from_parts(listing, location)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Listings",
    operation_id = "updateListing",
    summary = "Edit a listing",
    description = "Full-replace edit over the same form as creation. Only the listing's own \
        seller may edit it. Omitting the `image` part keeps the stored image unchanged.",
    params(("id" = Uuid, Path, description = "Listing ID")),
    request_body(content_type = "multipart/form-data", description = "Listing and location fields plus optional replacement image"),
    responses(
        (status = 200, description = "Listing updated", body = ListingResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the listing's seller (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Listing not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, seller, multipart), fields(username = %seller.username))]
pub async fn update_listing(
    seller: AuthSeller,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ListingResponse>, AppError> {
    let (fields, location_fields, image) = parse_listing_form(multipart).await?;

    let (listing, location) = submission::edit(
        &state.db,
        state.storage.as_ref(),
        &seller,
        id,
        fields,
        location_fields,
        image,
    )
    .await?;

    Ok(Json(ListingResponse::from_parts(listing, Some(location))))
}

#[utoipa::path(
    post,
    path = "/{id}/enquire",
    tag = "Listings",
    operation_id = "enquireListing",
    summary = "Express interest in a listing",
    description = "Sends a single notification to the listing's seller with the requester's \
        contact details. A dispatch failure is reported in the body, not retried.",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Enquiry sent", body = EnquiryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Listing not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Dispatch failed", body = EnquiryResponse),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, seller), fields(username = %seller.username))]
pub async fn enquire_listing(
    seller: AuthSeller,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = enquiry::enquire(&state.db, state.notifier.as_ref(), &seller, id).await?;

    let status = if outcome.delivered {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    Ok((
        status,
        Json(EnquiryResponse {
            success: outcome.delivered,
            message: outcome.message,
        }),
    ))
}

const LISTING_KEYS: &[&str] = &[
    "brand",
    "model",
    "vin",
    "mileage",
    "color",
    "description",
    "engine",
    "transmission",
];
const LOCATION_KEYS: &[&str] = &["address", "city", "state", "zip_code"];

/// Split a multipart submission into the two sub-forms plus the optional
/// image part. Text fields are collected into JSON objects and deserialized
/// so the form shares defaults with the JSON field types; an empty text
/// part counts as absent. Unknown parts are ignored.
async fn parse_listing_form(
    mut multipart: Multipart,
) -> Result<(ListingFields, LocationFields, Option<NewImage>), AppError> {
    let mut listing_map = serde_json::Map::new();
    let mut location_map = serde_json::Map::new();
    let mut image: Option<NewImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;

            // Browsers submit an empty part for an untouched file input.
            if filename.is_empty() && data.is_empty() {
                continue;
            }

            image = Some(NewImage {
                filename,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let is_listing = LISTING_KEYS.contains(&name.as_str());
        let is_location = LOCATION_KEYS.contains(&name.as_str());
        if !is_listing && !is_location {
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;
        if text.trim().is_empty() {
            continue;
        }

        let value = if name == "mileage" {
            let n: i32 = text
                .trim()
                .parse()
                .map_err(|_| AppError::Validation("mileage must be an integer".into()))?;
            Value::from(n)
        } else {
            Value::String(text)
        };

        if is_listing {
            listing_map.insert(name, value);
        } else {
            location_map.insert(name, value);
        }
    }

    let fields: ListingFields = serde_json::from_value(Value::Object(listing_map))
        .map_err(|e| AppError::Validation(format!("Invalid listing fields: {e}")))?;
    let location_fields: LocationFields = serde_json::from_value(Value::Object(location_map))
        .map_err(|e| AppError::Validation(format!("Invalid location fields: {e}")))?;

    Ok((fields, location_fields, image))
}
