use crate::config::MailConfig;
use crate::notify::{Notifier, RunSummary};
use crate::{Error, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::debug;

/// Port on which the relay expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends the report through an SMTP relay.
pub struct SmtpNotifier {
    config: MailConfig,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn build_message(&self, summary: &RunSummary) -> Result<Message> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.config.from)?)
            .subject(self.config.subject.clone());

        for recipient in &self.config.to {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .header(ContentType::TEXT_PLAIN)
            .body(summary.body())
            .map_err(|e| Error::Notification(format!("Unable to build email: {}", e)))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let tls_parameters = TlsParameters::new(self.config.host.clone())
            .map_err(|e| Error::Notification(format!("Invalid TLS parameters: {}", e)))?;

        let tls = if self.config.port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
            .port(self.config.port)
            .tls(tls)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)));

        if !self.config.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<()> {
        let message = self.build_message(summary)?;
        let transport = self.transport()?;

        debug!(
            relay = %format!("{}:{}", self.config.host, self.config.port),
            "Sending notification email"
        );

        transport
            .send(message)
            .await
            .map_err(|e| Error::Notification(format!("Unable to send email: {}", e)))?;
        Ok(())
    }

    fn recipients(&self) -> Vec<String> {
        self.config.to.clone()
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| Error::Notification(format!("Invalid address '{}': {}", address, e)))
}
