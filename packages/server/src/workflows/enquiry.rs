//! Buyer-to-seller enquiries.
//!
//! Resolves the listing, composes a plain-text message addressed to the
//! listing's seller, and hands it to the configured notification channel
//! exactly once. An unknown listing fails before any dispatch; a dispatch
//! failure is an outcome, not an error.

use common::notify::NotificationChannel;
use sea_orm::DatabaseConnection;
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::entity::seller;
use crate::error::AppError;
use crate::extractors::auth::AuthSeller;

use super::submission::find_listing;

/// What happened to a single dispatch attempt. Mirrored to the client.
pub struct EnquiryOutcome {
    pub delivered: bool,
    pub message: String,
}

pub async fn enquire(
    db: &DatabaseConnection,
    notifier: &dyn NotificationChannel,
    requester: &AuthSeller,
    listing_id: Uuid,
) -> Result<EnquiryOutcome, AppError> {
    let listing = find_listing(db, listing_id).await?;

    let owner = seller::Entity::find_by_id(listing.seller_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("listing has no seller row".into()))?;

    let subject = format!("Interest in Your Listing: {}", listing.model);
    let body = format!(
        "Hello {},\n\n\
         {} ({}) is interested in your car listing for {}.\n\
         Please contact them directly at {} for further communication.\n\n\
         Thank you for using AutoVerse!",
        owner.username, requester.username, requester.email, listing.model, requester.email,
    );

    match notifier.send(&subject, &body, &owner.email).await {
        Ok(()) => Ok(EnquiryOutcome {
            delivered: true,
            message: "Email sent successfully!".to_string(),
        }),
        Err(err) => {
            tracing::warn!(listing_id = %listing_id, error = %err, "enquiry dispatch failed");
            Ok(EnquiryOutcome {
                delivered: false,
                message: format!("Failed to send email: {err}"),
            })
        }
    }
}
