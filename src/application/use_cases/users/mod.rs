pub mod get_user;
pub mod list_users;
pub mod set_active;
pub mod set_roles;
pub mod unlock_user;
