// src/lib.rs
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use error::ProjectionError;
pub use services::dashboard::{compare, ProjectionContext};
pub use services::registry::lookup;
pub use services::reserves::project;
pub use services::scenarios::{define, define_easing};
