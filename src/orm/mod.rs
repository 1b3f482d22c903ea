pub mod audit_log;
pub mod case_messages;
pub mod cases;
pub mod listings;
pub mod user_roles;
pub mod users;
