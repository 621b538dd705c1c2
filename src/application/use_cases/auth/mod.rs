pub mod change_password;
pub mod email_verification;
pub mod google_login;
pub mod issue_session;
pub mod list_sessions;
pub mod login;
pub mod logout;
pub mod me;
pub(crate) mod notifications;
pub mod password_reset;
pub mod refresh;
pub mod register;
pub mod revoke_session;
pub mod sweep_sessions;
