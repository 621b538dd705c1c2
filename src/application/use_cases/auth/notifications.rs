use crate::application::ports::mailer::{MailMessage, Mailer};
use crate::application::services::auth_settings::AuthSettings;
use crate::domain::identity::user::User;

pub(crate) fn verification_message(settings: &AuthSettings, user: &User, token: &str) -> MailMessage {
    let link = format!(
        "{}/verify-email?token={}",
        settings.public_base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    );
    MailMessage {
        to: user.email.clone(),
        to_name: Some(user.display_name.clone()),
        subject: "Confirm your email address".into(),
        text_body: format!(
            "Hello {},\n\nConfirm your email address by opening this link:\n{}\n\nThe link expires in {} hours.\n",
            user.display_name,
            link,
            settings.verification_ttl.num_hours()
        ),
    }
}

pub(crate) fn reset_message(settings: &AuthSettings, user: &User, token: &str) -> MailMessage {
    let link = format!(
        "{}/reset-password?token={}",
        settings.public_base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    );
    MailMessage {
        to: user.email.clone(),
        to_name: Some(user.display_name.clone()),
        subject: "Reset your password".into(),
        text_body: format!(
            "Hello {},\n\nA password reset was requested for your account. Choose a new password here:\n{}\n\nThe link expires in {} minutes. If you did not ask for this, ignore this message.\n",
            user.display_name,
            link,
            settings.reset_ttl.num_minutes()
        ),
    }
}

/// Mail delivery failures never fail the calling use case.
pub(crate) async fn deliver<M: Mailer + ?Sized>(mailer: &M, message: MailMessage) {
    let to = message.to.clone();
    let subject = message.subject.clone();
    if let Err(err) = mailer.send(message).await {
        tracing::warn!(to = %to, subject = %subject, error = ?err, "failed to send mail");
    }
}
