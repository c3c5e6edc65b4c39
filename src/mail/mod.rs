use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ReportError, Result};

/// Everything needed to address one report email
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
}

impl Envelope {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            from: config.email_from()?.to_string(),
            to: config.recipients()?.to_vec(),
            subject: config.email.subject.clone(),
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| ReportError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn content_type_for(path: &std::path::Path) -> ContentType {
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    let mime = if is_png { "image/png" } else { "application/octet-stream" };
    ContentType::parse(mime).unwrap_or(ContentType::TEXT_PLAIN)
}

/// Build the report message: plain-text body plus every attachment that exists.
///
/// Missing attachment files are skipped with a warning.
pub fn build_message(envelope: &Envelope, body: &str, attachments: &[PathBuf]) -> Result<Message> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&envelope.from)?)
        .subject(envelope.subject.as_str());
    for recipient in &envelope.to {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(body.to_string()));
    for path in attachments {
        if !path.exists() {
            warn!(path = %path.display(), "attachment not found, skipping");
            continue;
        }
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let bytes = fs::read(path)?;
        multipart = multipart.singlepart(Attachment::new(filename).body(bytes, content_type_for(path)));
    }

    builder
        .multipart(multipart)
        .map_err(|e| ReportError::Delivery(e.to_string()))
}

/// SMTP over implicit TLS with username/password authentication
pub fn smtp_transport(config: &Config) -> Result<SmtpTransport> {
    let credentials = Credentials::new(
        config.smtp_username()?.to_string(),
        config.smtp_password()?.to_string(),
    );

    let transport = SmtpTransport::relay(config.smtp_host()?)
        .map_err(|e| ReportError::Delivery(e.to_string()))?
        .port(config.smtp.port)
        .credentials(credentials)
        .build();

    Ok(transport)
}

/// Send once; no retry
pub fn deliver<T>(transport: &T, message: &Message) -> Result<()>
where
    T: Transport,
    T::Error: std::fmt::Display,
{
    transport
        .send(message)
        .map_err(|e| ReportError::Delivery(e.to_string()))?;

    let recipients: Vec<String> = message
        .envelope()
        .to()
        .iter()
        .map(|a| a.to_string())
        .collect();
    info!(to = %recipients.join(", "), "report sent");
    Ok(())
}
