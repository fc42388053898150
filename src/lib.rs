//! Reporter's Note — photo-assignment job board
//!
//! A small job-matching service: admins post paid photo assignments,
//! field workers claim them, submit photo reports, and wait for
//! approval. Jobs walk a four-state lifecycle (open → assigned →
//! review → completed, with a rejection path back to assigned), every
//! transition enforced with a conditional database update.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
