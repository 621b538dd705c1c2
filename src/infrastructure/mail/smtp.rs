use anyhow::anyhow;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::application::ports::mailer::{MailMessage, Mailer};

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub from_name: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> anyhow::Result<Self> {
        let from = format!("{} <{}>", settings.from_name, settings.from_address)
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("invalid from address: {e}"))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| anyhow!("smtp transport: {e}"))?
            .port(settings.port);
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        let to = match &message.to_name {
            Some(name) => format!("{name} <{}>", message.to),
            None => message.to.clone(),
        };
        let email = Message::builder()
            .from(self.from.clone())
            .to(to.parse().map_err(|e| anyhow!("invalid recipient: {e}"))?)
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.text_body)
            .map_err(|e| anyhow!("build email: {e}"))?;
        self.transport
            .send(email)
            .await
            .map_err(|e| anyhow!("smtp send: {e}"))?;
        tracing::debug!(to = %message.to, "mail sent");
        Ok(())
    }
}
