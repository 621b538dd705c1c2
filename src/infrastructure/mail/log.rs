use async_trait::async_trait;

use crate::application::ports::mailer::{MailMessage, Mailer};

/// Fallback when no SMTP host is configured: the message is only logged.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text_body,
            "smtp not configured; mail logged instead of sent"
        );
        Ok(())
    }
}
