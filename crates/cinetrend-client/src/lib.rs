//! CineTrend Client - Client library for the movie catalog service
//!
//! This crate provides:
//! - The `CatalogService` trait the query controller talks to
//! - An HTTP implementation of it over the catalog's REST endpoints
//! - Endpoint configuration read from the environment

pub mod client;
pub mod config;
pub mod error;
pub mod service;

pub use client::*;
pub use config::*;
pub use error::*;
pub use service::*;
