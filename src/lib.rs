pub mod app_config;
pub mod audit;
pub mod cases;
pub mod db;
pub mod error;
pub mod middleware;
pub mod moderation;
pub mod orm;
pub mod reporting;
pub mod roles;
pub mod web;
