use std::path::PathBuf;

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use time::Date;

use crate::{config::MailConfig, render::xlsx::XLSX_CONTENT_TYPE};

pub const SUBJECT_PREFIX: &str = "KEPCO 일일 및 15분 간격 보고서";
pub const BODY: &str = "첨부된 파일은 KEPCO 일일 전력 사용량 보고서와 15분 간격 전력 사용량 보고서입니다.";

#[derive(thiserror::Error, Debug)]
pub enum MailError {
    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("no recipients configured")]
    NoRecipients,
    #[error("none of the report files could be read")]
    NoAttachments,
    #[error("invalid content type: {0}")]
    ContentType(String),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait::async_trait]
pub trait ReportMailer: Send + Sync {
    /// Sends one message carrying every readable file in `attachments`.
    async fn send_reports(&self, attachments: &[PathBuf], sent_on: Date) -> Result<(), MailError>;
}

pub fn subject_for(sent_on: Date) -> String {
    format!("{SUBJECT_PREFIX} - {sent_on}")
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Loads attachment bodies, dropping files that cannot be read.
pub async fn read_attachments(paths: &[PathBuf]) -> Vec<(String, Vec<u8>)> {
    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match tokio::fs::read(path).await {
            Ok(bytes) => loaded.push((name, bytes)),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "attachment not readable, skipping"
            ),
        }
    }
    loaded
}

pub fn build_message(
    cfg: &MailConfig,
    attachments: Vec<(String, Vec<u8>)>,
    sent_on: Date,
) -> Result<Message, MailError> {
    if cfg.recipients.is_empty() {
        return Err(MailError::NoRecipients);
    }
    if attachments.is_empty() {
        return Err(MailError::NoAttachments);
    }

    let mut builder = Message::builder().from(mailbox(&cfg.from)?).subject(subject_for(sent_on));
    for recipient in &cfg.recipients {
        builder = builder.to(mailbox(recipient)?);
    }

    let content_type =
        ContentType::parse(XLSX_CONTENT_TYPE).map_err(|e| MailError::ContentType(e.to_string()))?;
    let mut body = MultiPart::mixed().singlepart(SinglePart::plain(BODY.to_string()));
    for (name, bytes) in attachments {
        body = body.singlepart(Attachment::new(name).body(bytes, content_type.clone()));
    }

    Ok(builder.multipart(body)?)
}

/// Authenticated SMTP with STARTTLS.
pub struct SmtpMailer {
    cfg: MailConfig,
}

impl SmtpMailer {
    pub fn new(cfg: MailConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait::async_trait]
impl ReportMailer for SmtpMailer {
    async fn send_reports(&self, attachments: &[PathBuf], sent_on: Date) -> Result<(), MailError> {
        let message = build_message(&self.cfg, read_attachments(attachments).await, sent_on)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.cfg.smtp_host)?
            .port(self.cfg.smtp_port)
            .credentials(Credentials::new(self.cfg.username.clone(), self.cfg.password.clone()))
            .build();

        transport.send(message).await?;
        tracing::info!(
            host = %self.cfg.smtp_host,
            recipients = self.cfg.recipients.len(),
            "report mail sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn mail_config(recipients: &[&str]) -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "reports@example.com".to_string(),
            password: String::new(),
            from: "reports@example.com".to_string(),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn subject_uses_iso_date() {
        assert_eq!(
            subject_for(date!(2024 - 10 - 02)),
            "KEPCO 일일 및 15분 간격 보고서 - 2024-10-02"
        );
    }

    #[test]
    fn message_carries_every_recipient_and_attachment() {
        let cfg = mail_config(&["a@example.com", "b@example.com"]);
        let attachments = vec![
            ("kepco_daily_report_20241002_060000.xlsx".to_string(), vec![1, 2, 3]),
            ("kepco_15min_report_20241002_060001.xlsx".to_string(), vec![4, 5, 6]),
        ];

        let message = build_message(&cfg, attachments, date!(2024 - 10 - 02)).unwrap();
        assert_eq!(message.envelope().to().len(), 2);

        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains("kepco_daily_report_20241002_060000.xlsx"));
        assert!(raw.contains("kepco_15min_report_20241002_060001.xlsx"));
    }

    #[test]
    fn refuses_empty_recipients_or_attachments() {
        let attachments = vec![("a.xlsx".to_string(), vec![0])];
        assert!(matches!(
            build_message(&mail_config(&[]), attachments, date!(2024 - 10 - 02)),
            Err(MailError::NoRecipients)
        ));
        assert!(matches!(
            build_message(&mail_config(&["a@example.com"]), Vec::new(), date!(2024 - 10 - 02)),
            Err(MailError::NoAttachments)
        ));
        assert!(matches!(
            build_message(
                &mail_config(&["not an address"]),
                vec![("a.xlsx".to_string(), vec![0])],
                date!(2024 - 10 - 02)
            ),
            Err(MailError::Address { .. })
        ));
    }

    #[tokio::test]
    async fn unreadable_attachments_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.xlsx");
        std::fs::write(&present, b"xlsx").unwrap();

        let loaded = read_attachments(&[present, dir.path().join("gone.xlsx")]).await;
        assert_eq!(loaded, vec![("present.xlsx".to_string(), b"xlsx".to_vec())]);
    }
}
