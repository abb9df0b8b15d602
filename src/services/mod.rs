// src/services/mod.rs
pub mod dashboard;
pub mod eras;
pub mod estimator;
pub mod export;
pub mod observations;
pub mod registry;
pub mod reserves;
pub mod scenarios;
