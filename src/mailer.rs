// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mail formatting and delivery.
//!
//! [`compose`] renders a validated submission into the plain-text and HTML
//! email the inbox receives. Delivery goes through the [`Mailer`] trait so
//! the handler never depends on a live SMTP server; [`SmtpMailer`] is the
//! production transport and [`RecordingMailer`] keeps messages in memory.

use crate::config::DeliverySettings;
use crate::validator::ContactMessage;
use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Delivery failures. Logged in full, never shown to the submitter.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid {field} address: {source}")]
    InvalidAddress {
        field: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Mail delivery unavailable: {0}")]
    Unavailable(String),
}

/// A fully rendered email, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: Mailbox,
    pub to: Mailbox,
    /// Submitter's address, when lettre can parse it.
    pub reply_to: Option<Mailbox>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Something that can deliver an [`OutgoingMail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, settings: &DeliverySettings, mail: OutgoingMail)
        -> Result<(), DeliveryError>;
}

/// Render a submission into the email sent to the contact inbox.
pub fn compose(
    message: &ContactMessage,
    settings: &DeliverySettings,
) -> Result<OutgoingMail, DeliveryError> {
    let from = Mailbox::new(
        Some(settings.sender_name.clone()),
        parse_address("from", &settings.from_address)?,
    );
    let to = Mailbox::new(None, parse_address("to", &settings.to_address)?);
    let reply_to = match parse_address("reply-to", &message.email) {
        Ok(address) => Some(Mailbox::new(None, address)),
        Err(err) => {
            warn!(error = %err, "Sending without Reply-To");
            None
        }
    };

    let subject = match &message.company {
        Some(company) => format!("Contact Form: {} ({})", message.name, company),
        None => format!("Contact Form: {}", message.name),
    };

    let company_line = message
        .company
        .as_ref()
        .map(|company| format!("\nCompany: {company}"))
        .unwrap_or_default();
    let text = format!(
        "Name: {}\nEmail: {}{}\n\nMessage:\n{}",
        message.name, message.email, company_line, message.message
    );

    Ok(OutgoingMail {
        from,
        to,
        reply_to,
        subject,
        text,
        html: render_html(message),
    })
}

fn parse_address(field: &'static str, raw: &str) -> Result<lettre::Address, DeliveryError> {
    raw.trim()
        .parse()
        .map_err(|source| DeliveryError::InvalidAddress { field, source })
}

fn render_html(message: &ContactMessage) -> String {
    let name = escape_html(&message.name);
    let email = escape_html(&message.email);
    let body = escape_html(&message.message);
    let company_row = message
        .company
        .as_ref()
        .map(|company| {
            format!(
                r#"<tr><td style="padding: 8px 0; color: #525252; font-weight: 600;">Company:</td><td style="padding: 8px 0; color: #0a0a0a;">{}</td></tr>"#,
                escape_html(company)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background: #dc2626; padding: 20px 24px; border-radius: 8px 8px 0 0;">
    <h1 style="color: #ffffff; margin: 0; font-size: 20px;">New Contact Form Submission</h1>
  </div>
  <div style="background: #ffffff; padding: 24px; border: 1px solid #e5e5e5; border-top: none; border-radius: 0 0 8px 8px;">
    <table style="width: 100%; border-collapse: collapse;">
      <tr>
        <td style="padding: 8px 0; color: #525252; font-weight: 600; width: 100px;">Name:</td>
        <td style="padding: 8px 0; color: #0a0a0a;">{name}</td>
      </tr>
      <tr>
        <td style="padding: 8px 0; color: #525252; font-weight: 600;">Email:</td>
        <td style="padding: 8px 0; color: #0a0a0a;"><a href="mailto:{email}" style="color: #dc2626;">{email}</a></td>
      </tr>
      {company_row}
    </table>
    <hr style="border: none; border-top: 1px solid #e5e5e5; margin: 16px 0;" />
    <div style="color: #525252; font-weight: 600; margin-bottom: 8px;">Message:</div>
    <div style="color: #0a0a0a; white-space: pre-wrap; line-height: 1.6;">{body}</div>
  </div>
  <div style="text-align: center; padding: 16px; color: #a3a3a3; font-size: 12px;">
    Sent from secforit.ro contact form
  </div>
</div>
"#
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// SMTP delivery over implicit TLS (SMTPS).
///
/// The transport is built on first use and rebuilt only if the delivery
/// settings change.
#[derive(Default)]
pub struct SmtpMailer {
    transport: Mutex<Option<(DeliverySettings, AsyncSmtpTransport<Tokio1Executor>)>>,
}

impl SmtpMailer {
    pub fn new() -> Self {
        Self::default()
    }

    fn transport_for(
        &self,
        settings: &DeliverySettings,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let mut cached = self
            .transport
            .lock()
            .map_err(|_| DeliveryError::Unavailable("transport cache poisoned".into()))?;

        if let Some((cached_settings, transport)) = cached.as_ref() {
            if cached_settings == settings {
                return Ok(transport.clone());
            }
        }

        let tls = TlsParameters::builder(settings.host.clone())
            .dangerous_accept_invalid_certs(settings.accept_invalid_certs)
            .build_rustls()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            .port(settings.port)
            .tls(Tls::Wrapper(tls))
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(settings.timeout))
            .build();

        info!(
            host = %settings.host,
            port = settings.port,
            accept_invalid_certs = settings.accept_invalid_certs,
            "SMTP transport configured"
        );
        *cached = Some((settings.clone(), transport.clone()));
        Ok(transport)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        settings: &DeliverySettings,
        mail: OutgoingMail,
    ) -> Result<(), DeliveryError> {
        let transport = self.transport_for(settings)?;

        let mut builder = Message::builder().from(mail.from).to(mail.to);
        if let Some(reply_to) = mail.reply_to {
            builder = builder.reply_to(reply_to);
        }
        let message = builder
            .subject(mail.subject)
            .multipart(MultiPart::alternative_plain_html(mail.text, mail.html))?;

        let response = transport.send(message).await?;
        debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}

/// In-memory mailer that records every message it is given.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with a transport-style error.
    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.set_failing(true);
        mailer
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages delivered so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        _settings: &DeliverySettings,
        mail: OutgoingMail,
    ) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Unavailable("connection refused".into()));
        }
        self.sent
            .lock()
            .map_err(|_| DeliveryError::Unavailable("recording mailer poisoned".into()))?
            .push(mail);
        Ok(())
    }
}
