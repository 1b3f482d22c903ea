//! Staff dashboard: queue and moderation activity counts

use crate::error::ServiceError;
use crate::middleware::Actor;
use crate::reporting::{self, CaseQueueCounts, ModerationActivity, SiteHealthCounts};
use actix_web::{get, web, Error, HttpResponse};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(dashboard);
}

#[derive(Deserialize)]
struct DashboardQuery {
    /// Activity window in days. Defaults to 30.
    days: Option<i64>,
}

#[derive(Serialize)]
struct DashboardResponse {
    case_queues: CaseQueueCounts,
    moderation_activity: Vec<ModerationActivity>,
    site_health: SiteHealthCounts,
}

#[get("/admin/dashboard")]
async fn dashboard(actor: Actor, query: web::Query<DashboardQuery>) -> Result<HttpResponse, Error> {
    actor.require_staff().map_err(ServiceError::from)?;

    let days = query.days.unwrap_or(30).clamp(1, 365);
    let since = Utc::now().naive_utc() - Duration::days(days);

    let case_queues = reporting::case_queue_counts()
        .await
        .map_err(ServiceError::from)?;
    let moderation_activity = reporting::moderation_activity(since)
        .await
        .map_err(ServiceError::from)?;
    let site_health = reporting::site_health_counts()
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(DashboardResponse {
        case_queues,
        moderation_activity,
        site_health,
    }))
}
