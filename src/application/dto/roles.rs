use validator::Validate;

use crate::domain::identity::permission::Permission;

#[derive(Debug, Clone, Validate)]
pub struct RoleInput {
    #[validate(length(min = 2, max = 50, message = "must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(length(max = 250, message = "must be at most 250 characters"))]
    pub description: Option<String>,
    pub permissions: Vec<Permission>,
}
