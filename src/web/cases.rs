//! Case endpoints: tickets, message threads, lifecycle actions

use crate::cases;
use crate::error::ServiceError;
use crate::middleware::Actor;
use crate::orm::case_messages;
use crate::orm::cases::{CasePriority, CaseStatus, CaseType};
use actix_web::{get, post, web, Error, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(open_case)
        .service(get_case)
        .service(post_message)
        .service(list_messages)
        .service(escalate_case)
        .service(resolve_case)
        .service(close_case);
}

#[derive(Serialize)]
struct CaseResponse {
    id: i32,
    owner_id: i32,
    case_type: CaseType,
    subject: String,
    status: CaseStatus,
    priority: CasePriority,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
    resolved_at: Option<chrono::NaiveDateTime>,
    resolved_by: Option<i32>,
}

impl From<crate::orm::cases::Model> for CaseResponse {
    fn from(case: crate::orm::cases::Model) -> Self {
        Self {
            id: case.id,
            owner_id: case.owner_id,
            case_type: case.case_type,
            subject: case.subject,
            status: case.status,
            priority: case.priority,
            created_at: case.created_at,
            updated_at: case.updated_at,
            resolved_at: case.resolved_at,
            resolved_by: case.resolved_by,
        }
    }
}

#[derive(Deserialize, Validate)]
struct OpenCaseForm {
    case_type: CaseType,
    #[validate(length(min = 1, max = 255))]
    subject: String,
    priority: Option<CasePriority>,
}

/// Open a new support case. The actor becomes the owner.
#[post("/cases")]
async fn open_case(actor: Actor, form: web::Json<OpenCaseForm>) -> Result<HttpResponse, Error> {
    form.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let priority = form.priority.clone().unwrap_or(CasePriority::Medium);
    let case = cases::open_case(&actor, form.case_type.clone(), &form.subject, priority).await?;

    Ok(HttpResponse::Created().json(CaseResponse::from(case)))
}

/// Case detail, visible to the owner and staff.
#[get("/cases/{id}")]
async fn get_case(actor: Actor, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let case = cases::get_case(path.into_inner(), &actor).await?;

    Ok(HttpResponse::Ok().json(CaseResponse::from(case)))
}

#[derive(Serialize)]
struct MessageResponse {
    id: i32,
    case_id: i32,
    sender_id: i32,
    content: String,
    is_internal: bool,
    created_at: chrono::NaiveDateTime,
}

impl From<case_messages::Model> for MessageResponse {
    fn from(message: case_messages::Model) -> Self {
        Self {
            id: message.id,
            case_id: message.case_id,
            sender_id: message.sender_id,
            content: message.content,
            is_internal: message.is_internal,
            created_at: message.created_at,
        }
    }
}

#[derive(Deserialize, Validate)]
struct PostMessageForm {
    #[validate(length(min = 1))]
    content: String,
    #[serde(default)]
    is_internal: bool,
}

/// Post a message into a case thread. Internal notes are staff-only.
#[post("/cases/{id}/messages")]
async fn post_message(
    actor: Actor,
    path: web::Path<i32>,
    form: web::Json<PostMessageForm>,
) -> Result<HttpResponse, Error> {
    form.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let message =
        cases::post_message(path.into_inner(), &actor, &form.content, form.is_internal).await?;

    Ok(HttpResponse::Created().json(MessageResponse::from(message)))
}

/// List a case's messages. Internal notes are filtered out for non-staff
/// callers before the response is built.
#[get("/cases/{id}/messages")]
async fn list_messages(actor: Actor, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let messages = cases::list_messages(path.into_inner(), &actor).await?;

    let response: Vec<MessageResponse> = messages.into_iter().map(MessageResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

#[derive(Deserialize, Validate)]
struct EscalateForm {
    #[validate(length(min = 1))]
    reason: String,
}

#[post("/cases/{id}/escalate")]
async fn escalate_case(
    actor: Actor,
    path: web::Path<i32>,
    form: web::Json<EscalateForm>,
) -> Result<HttpResponse, Error> {
    form.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let case = cases::escalate(path.into_inner(), &actor, &form.reason).await?;

    Ok(HttpResponse::Ok().json(CaseResponse::from(case)))
}

#[derive(Deserialize)]
struct CloseoutForm {
    note: Option<String>,
}

#[post("/cases/{id}/resolve")]
async fn resolve_case(
    actor: Actor,
    path: web::Path<i32>,
    form: web::Json<CloseoutForm>,
) -> Result<HttpResponse, Error> {
    let case = cases::resolve(path.into_inner(), &actor, form.note.as_deref()).await?;

    Ok(HttpResponse::Ok().json(CaseResponse::from(case)))
}

#[post("/cases/{id}/close")]
async fn close_case(
    actor: Actor,
    path: web::Path<i32>,
    form: web::Json<CloseoutForm>,
) -> Result<HttpResponse, Error> {
    let case = cases::close_case(path.into_inner(), &actor, form.note.as_deref()).await?;

    Ok(HttpResponse::Ok().json(CaseResponse::from(case)))
}
