//! Role assignment endpoints (admin only for writes)

use crate::error::ServiceError;
use crate::middleware::Actor;
use crate::orm::user_roles::Role;
use crate::roles;
use actix_web::{get, post, web, Error, HttpResponse};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(get_role).service(set_role);
}

#[derive(Serialize)]
struct RoleResponse {
    user_id: i32,
    role: Role,
}

/// Current role of a user (staff only).
#[get("/admin/users/{id}/role")]
async fn get_role(actor: Actor, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    actor.require_staff().map_err(ServiceError::from)?;

    let user_id = path.into_inner();
    let role = roles::role_of(user_id).await.map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(RoleResponse { user_id, role }))
}

#[derive(Deserialize)]
struct SetRoleForm {
    role: Role,
}

/// Replace a user's role. Admin only; the change itself is audited.
#[post("/admin/users/{id}/role")]
async fn set_role(
    actor: Actor,
    path: web::Path<i32>,
    form: web::Json<SetRoleForm>,
) -> Result<HttpResponse, Error> {
    let assignment = roles::set_role(path.into_inner(), form.role.clone(), &actor).await?;

    Ok(HttpResponse::Ok().json(RoleResponse {
        user_id: assignment.user_id,
        role: assignment.role,
    }))
}
