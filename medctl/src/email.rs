//! Outbound email: the message model, the transport seam, and the lettre-backed transport.

use async_trait::async_trait;
use lettre::{
    Address, AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::path::Path;

use crate::config::{EmailConfig, EmailTransportConfig};
use crate::errors::Error;

/// A plain-text email ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Anything that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error>;
}

/// SMTP or file delivery through lettre
pub struct LettreTransport {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl LettreTransport {
    pub fn new(config: &EmailConfig) -> Result<Self, Error> {
        let transport = match &config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let mut smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .timeout(Some(config.timeout));

                if !username.is_empty() {
                    smtp_builder = smtp_builder.credentials(Credentials::new(username.clone(), password.clone()));
                }

                EmailTransport::Smtp(smtp_builder.build())
            }
            EmailTransportConfig::File { path } => {
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, Error> {
        let from = mailbox(Some(&self.from_name), &self.from_email).map_err(|e| Error::Internal {
            operation: format!("parse from email: {e}"),
        })?;
        let to = mailbox(email.to_name.as_deref(), &email.to).map_err(|e| Error::Internal {
            operation: format!("parse to email: {e}"),
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| Error::Internal {
                operation: format!("build email message: {e}"),
            })
    }
}

/// Display names go through `Mailbox::new` so commas and quotes are encoded, not parsed
fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, AddressError> {
    let address = address.trim().parse::<Address>()?;
    let name = name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    Ok(Mailbox::new(name, address))
}

#[async_trait]
impl MailTransport for LettreTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        let message = self.build_message(email)?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }
}
