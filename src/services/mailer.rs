//! Report Dispatcher: hands a rendered report to the mail transport.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid mail address {0:?}")]
    Address(String),

    #[error("could not build message: {0}")]
    Message(String),

    #[error("mail transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait ReportDispatcher: Send + Sync {
    /// Sends once. Failures are returned to the caller, never retried here.
    async fn dispatch(
        &self,
        recipient: &str,
        subject: &str,
        body_markup: &str,
    ) -> Result<(), DispatchError>;
}

pub struct SmtpDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

fn mailbox(address: &str) -> Result<Mailbox, DispatchError> {
    address
        .parse()
        .map_err(|_| DispatchError::Address(address.to_string()))
}

impl SmtpDispatcher {
    pub fn new(config: &SmtpConfig) -> Result<Self, DispatchError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DispatchError::Transport(e.to_string()))?
            .port(config.port);

        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: mailbox(&config.from)?,
        })
    }
}

#[async_trait]
impl ReportDispatcher for SmtpDispatcher {
    async fn dispatch(
        &self,
        recipient: &str,
        subject: &str,
        body_markup: &str,
    ) -> Result<(), DispatchError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mailbox(recipient)?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body_markup.to_string())
            .map_err(|e| DispatchError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        Ok(())
    }
}
