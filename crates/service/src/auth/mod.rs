//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Legacy password accounts: registration, login, session tokens and the
//! administrator bootstrap.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthConfig, AuthService};
