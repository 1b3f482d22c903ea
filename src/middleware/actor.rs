//! Verified caller identity for a single request cycle.
//!
//! Authentication happens upstream: the fronting gateway validates the
//! session and stamps the actor id and current role onto the request as
//! headers. This service trusts those values and threads them explicitly
//! through every engine call; there is no ambient "current actor" state.

use crate::error::ServiceError;
use crate::orm::user_roles::Role;
use actix_web::dev::Payload;
use actix_web::{error, Error, FromRequest, HttpRequest};
use futures::future::{err, ready, Ready};

pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";

/// Authenticated actor: id plus the single current role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i32, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Require a staff role (support, moderator, admin).
    pub fn require_staff(&self) -> Result<(), ServiceError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied)
        }
    }

    /// Require the admin role. Destructive actions gate on this.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied)
        }
    }
}

/// This implementation is what provides `actor: Actor` in the parameters of
/// route functions.
impl FromRequest for Actor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let id = req
            .headers()
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i32>().ok());
        let role = req
            .headers()
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<Role>().ok());

        match (id, role) {
            (Some(id), Some(role)) => ready(Ok(Actor::new(id, role))),
            _ => err(error::ErrorUnauthorized(
                "Missing or invalid actor identity headers",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_rt::test]
    async fn extracts_actor_from_headers() {
        let req = TestRequest::default()
            .insert_header((ACTOR_ID_HEADER, "42"))
            .insert_header((ACTOR_ROLE_HEADER, "moderator"))
            .to_http_request();

        let actor = Actor::from_request(&req, &mut Payload::None)
            .await
            .expect("actor should extract");

        assert_eq!(actor, Actor::new(42, Role::Moderator));
        assert!(actor.is_staff());
        assert!(!actor.is_admin());
    }

    #[actix_rt::test]
    async fn rejects_missing_or_bad_headers() {
        let req = TestRequest::default().to_http_request();
        assert!(Actor::from_request(&req, &mut Payload::None).await.is_err());

        let req = TestRequest::default()
            .insert_header((ACTOR_ID_HEADER, "42"))
            .insert_header((ACTOR_ROLE_HEADER, "superuser"))
            .to_http_request();
        assert!(Actor::from_request(&req, &mut Payload::None).await.is_err());
    }

    #[test]
    fn role_gates() {
        assert!(Actor::new(1, Role::Admin).require_admin().is_ok());
        assert!(matches!(
            Actor::new(1, Role::Support).require_admin(),
            Err(ServiceError::PermissionDenied)
        ));
        assert!(Actor::new(1, Role::Support).require_staff().is_ok());
        assert!(matches!(
            Actor::new(1, Role::User).require_staff(),
            Err(ServiceError::PermissionDenied)
        ));
    }
}
