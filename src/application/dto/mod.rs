pub mod auth;
pub mod league;
pub mod roles;
