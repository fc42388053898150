pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod jobs;
pub mod metrics;
pub mod reports;
