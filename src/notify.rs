//! Completion notifications over Pushover and SMTP.
//!
//! Delivery is best-effort. A channel is used only when every credential it
//! needs is present, and a failing channel never stops the other one or the
//! caller.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{info, warn};

use crate::config::{EmailCredentials, Notifications, PushoverCredentials};
use crate::error::NotifyError;
use crate::http::HttpClient;

pub const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// A fully addressed plain-text message ready for an SMTP relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), NotifyError>;
}

/// STARTTLS submission through lettre
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpMailer;

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|e: lettre::address::AddressError| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), NotifyError> {
        let server = format!("{}:{}", mail.host, mail.port);
        let smtp_error = |reason: String| NotifyError::Smtp {
            server: server.clone(),
            reason,
        };

        let message = Message::builder()
            .from(mailbox(&mail.from)?)
            .to(mailbox(&mail.to)?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| smtp_error(e.to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.host)
            .map_err(|e| smtp_error(e.to_string()))?
            .port(mail.port)
            .credentials(Credentials::new(mail.user, mail.password))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| smtp_error(e.to_string()))?;
        Ok(())
    }
}

/// Split `host[:port]`, defaulting to the submission port
pub fn split_server(server: &str) -> Result<(String, u16), NotifyError> {
    match server.split_once(':') {
        None => Ok((server.to_string(), DEFAULT_SMTP_PORT)),
        Some((host, port)) => {
            let port = port.parse().map_err(|_| NotifyError::Smtp {
                server: server.to_string(),
                reason: format!("invalid port {port:?}"),
            })?;
            Ok((host.to_string(), port))
        }
    }
}

/// What happened on one channel
#[derive(Debug)]
pub enum Delivery {
    NotConfigured,
    Sent,
    Failed(NotifyError),
}

impl Delivery {
    fn from_result(channel: &str, result: Result<(), NotifyError>) -> Self {
        match result {
            Ok(()) => {
                info!("{channel} notification sent");
                Delivery::Sent
            }
            Err(e) => {
                warn!("{channel} notification failed: {e}");
                Delivery::Failed(e)
            }
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

#[derive(Debug)]
pub struct NotifyReport {
    pub pushover: Delivery,
    pub email: Delivery,
}

pub struct Notifier {
    http: Arc<dyn HttpClient>,
    mailer: Arc<dyn MailSender>,
    pushover_url: String,
}

impl Notifier {
    pub fn new(http: Arc<dyn HttpClient>, mailer: Arc<dyn MailSender>) -> Self {
        Self {
            http,
            mailer,
            pushover_url: PUSHOVER_URL.to_string(),
        }
    }

    pub fn with_pushover_url(mut self, url: impl Into<String>) -> Self {
        self.pushover_url = url.into();
        self
    }

    pub async fn notify(&self, channels: &Notifications, subject: &str, body: &str) -> NotifyReport {
        let pushover = if channels.pushover.is_configured() {
            Delivery::from_result("Pushover", self.pushover(&channels.pushover, subject, body).await)
        } else {
            Delivery::NotConfigured
        };

        let email = if channels.email.is_configured() {
            Delivery::from_result("Email", self.email(&channels.email, subject, body).await)
        } else {
            Delivery::NotConfigured
        };

        NotifyReport { pushover, email }
    }

    async fn pushover(
        &self,
        credentials: &PushoverCredentials,
        title: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        let mut form = vec![
            ("token".to_string(), credentials.token.clone()),
            ("user".to_string(), credentials.user.clone()),
            ("message".to_string(), message.to_string()),
        ];
        if !title.is_empty() {
            form.push(("title".to_string(), title.to_string()));
        }
        self.http.post_form(&self.pushover_url, form).await?;
        Ok(())
    }

    async fn email(&self, credentials: &EmailCredentials, subject: &str, body: &str) -> Result<(), NotifyError> {
        let (host, port) = split_server(&credentials.server)?;
        self.mailer
            .send(OutgoingMail {
                host,
                port,
                user: credentials.user.clone(),
                password: credentials.password.clone(),
                from: credentials.from.clone(),
                to: credentials.to.clone(),
                subject: subject.to_string(),
                body: body.to_string(),
            })
            .await
    }
}
