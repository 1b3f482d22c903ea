pub mod audit;
pub mod cases;
pub mod dashboard;
pub mod moderation;
pub mod roles;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    audit::configure(conf);
    cases::configure(conf);
    dashboard::configure(conf);
    moderation::configure(conf);
    roles::configure(conf);
}
