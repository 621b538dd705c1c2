use crate::application::dto::auth::{RegisterInput, UserProfile, normalize_email};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::mailer::Mailer;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::auth_settings::AuthSettings;
use crate::application::services::passwords::{hash_password, strength_problem};
use crate::application::services::secrets::{generate_opaque_token, hash_token};
use crate::application::services::validation::Violations;
use crate::application::use_cases::auth::notifications;
use crate::domain::identity::role::USER_ROLE;
use crate::domain::identity::user::NewUser;

pub struct Register<'a, U, R, M>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub users: &'a U,
    pub roles: &'a R,
    pub mailer: &'a M,
    pub settings: &'a AuthSettings,
}

impl<'a, U, R, M> Register<'a, U, R, M>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, input: RegisterInput) -> AppResult<UserProfile> {
        let input = RegisterInput {
            email: normalize_email(&input.email),
            display_name: input.display_name.trim().to_string(),
            password: input.password,
        };
        let mut violations = Violations::of(&input);
        if let Some(problem) = strength_problem(&input.password) {
            violations.push("password", problem);
        }
        violations.into_result()?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::conflict("email is already registered"));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create_user(&NewUser {
                email: input.email,
                display_name: input.display_name,
                password_hash: Some(password_hash),
                email_verified: false,
                google_subject: None,
            })
            .await?;

        let roles = match self.roles.find_by_name(USER_ROLE).await? {
            Some(role) => {
                self.roles.set_user_roles(user.id, &[role.id]).await?;
                vec![role]
            }
            None => {
                tracing::warn!(user_id = %user.id, "default role missing; user registered without roles");
                Vec::new()
            }
        };

        let token = generate_opaque_token();
        self.users
            .set_verification_token(
                user.id,
                &hash_token(&token),
                chrono::Utc::now() + self.settings.verification_ttl,
            )
            .await?;
        notifications::deliver(
            self.mailer,
            notifications::verification_message(self.settings, &user, &token),
        )
        .await;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(UserProfile::build(&user, &roles))
    }
}
