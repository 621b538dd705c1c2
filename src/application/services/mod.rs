pub mod auth_settings;
pub mod passwords;
pub mod secrets;
pub mod validation;
