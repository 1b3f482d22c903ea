//! Moderation endpoints for user accounts and marketplace listings

use crate::error::ServiceError;
use crate::middleware::Actor;
use crate::moderation::{self, ListingAction, UserAction};
use crate::orm::listings::ListingStatus;
use actix_web::{post, web, Error, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(user_action).service(listing_action);
}

#[derive(Deserialize, Validate)]
struct UserActionForm {
    action: UserAction,
    #[validate(length(min = 1))]
    reason: String,
}

#[derive(Serialize)]
struct UserActionResponse {
    user_id: i32,
    is_banned: bool,
    is_suspended: bool,
    is_restricted: bool,
    warnings_count: i32,
    audit_entry_id: i32,
}

/// Apply a moderation action to a user account.
#[post("/admin/users/{id}/action")]
async fn user_action(
    actor: Actor,
    path: web::Path<i32>,
    form: web::Json<UserActionForm>,
) -> Result<HttpResponse, Error> {
    form.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let (user, entry) = moderation::apply_user_action(
        path.into_inner(),
        &actor,
        form.action.clone(),
        &form.reason,
    )
    .await?;

    Ok(HttpResponse::Ok().json(UserActionResponse {
        user_id: user.id,
        is_banned: user.is_banned,
        is_suspended: user.is_suspended,
        is_restricted: user.is_restricted,
        warnings_count: user.warnings_count,
        audit_entry_id: entry.id,
    }))
}

#[derive(Deserialize, Validate)]
struct ListingActionForm {
    action: ListingAction,
    #[validate(length(min = 1))]
    reason: String,
}

#[derive(Serialize)]
struct ListingActionResponse {
    listing_id: i32,
    status: ListingStatus,
    audit_entry_id: i32,
}

/// Apply a moderation action to a marketplace listing.
#[post("/admin/listings/{id}/action")]
async fn listing_action(
    actor: Actor,
    path: web::Path<i32>,
    form: web::Json<ListingActionForm>,
) -> Result<HttpResponse, Error> {
    form.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let (listing, entry) = moderation::apply_listing_action(
        path.into_inner(),
        &actor,
        form.action.clone(),
        &form.reason,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ListingActionResponse {
        listing_id: listing.id,
        status: listing.status,
        audit_entry_id: entry.id,
    }))
}
