use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub text_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()>;
}
