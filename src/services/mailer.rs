//! Outbound email. [`Mailer`] is the seam between report dispatch and the
//! transport, so tests can swap in a recording double; [`SmtpMailer`] is
//! the production implementation over an async SMTP pool.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// One report email: a text body plus the rendered PDF, addressed to every
/// eligible recipient at once.
#[derive(Debug, Clone)]
pub struct OutgoingReport {
    pub to: Vec<Mailbox>,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub pdf: Vec<u8>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, outgoing: OutgoingReport) -> Result<(), ServiceError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build from configuration. Returns `None` when no SMTP host is
    /// configured, letting the caller fall back to [`DisabledMailer`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, ServiceError> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(None);
        };

        let from: Mailbox = config
            .smtp_from
            .parse()
            .map_err(|_| ServiceError::MailError("invalid smtp_from address".into()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| ServiceError::MailError(format!("smtp relay setup failed: {e}")))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) =
            (config.smtp_username.clone(), config.smtp_password.clone())
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Some(Self {
            transport: builder.build(),
            from,
        }))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, outgoing), fields(recipients = outgoing.to.len(), subject = %outgoing.subject))]
    async fn send(&self, outgoing: OutgoingReport) -> Result<(), ServiceError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(outgoing.subject.clone());
        for mailbox in &outgoing.to {
            builder = builder.to(mailbox.clone());
        }

        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| ServiceError::MailError(format!("attachment content type: {e}")))?;

        let message = builder
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(outgoing.body))
                    .singlepart(
                        Attachment::new(outgoing.attachment_name).body(outgoing.pdf, pdf_type),
                    ),
            )
            .map_err(|e| ServiceError::MailError(format!("message assembly failed: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| ServiceError::MailError(format!("smtp delivery failed: {e}")))?;

        info!("report email delivered");
        Ok(())
    }
}

/// Stand-in when SMTP is not configured. Any send attempt fails loudly so
/// dispatch never silently drops a report.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _outgoing: OutgoingReport) -> Result<(), ServiceError> {
        Err(ServiceError::MailError(
            "email transport is not configured".into(),
        ))
    }
}
