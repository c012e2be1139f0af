pub mod errors;
pub mod db;
pub mod types;
pub mod validation;
pub mod auth_user;
pub mod legacy_registration;
pub mod profile;
pub mod event;
pub mod team;
pub mod registration;
pub mod announcement;

#[cfg(test)]
mod tests;
