//! SMTP delivery of rendered invoices.

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use std::path::Path;

use crate::core::config::EmailConfig;
use crate::invoicing::InvoicingError;

pub struct InvoiceEmail<'a> {
    pub to: &'a str,
    /// Shown as the sender's display name, usually the company name.
    pub sender_name: Option<&'a str>,
    pub invoice_number: &'a str,
    pub filename: &'a str,
    pub pdf: Vec<u8>,
}

pub fn build_invoice_message(
    config: &EmailConfig,
    email: InvoiceEmail<'_>,
) -> Result<Message, InvoicingError> {
    let from_address = config
        .from
        .parse()
        .map_err(|e| InvoicingError::Email(format!("Invalid from address: {e}")))?;
    let from = Mailbox::new(email.sender_name.map(str::to_string), from_address);
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| InvoicingError::Email(format!("Invalid to address: {e}")))?;

    let sender = email.sender_name.unwrap_or("us");
    let body = format!(
        "Hello,\n\nPlease find attached invoice {}.\n\nThank you for doing business with {sender}.\n",
        email.invoice_number
    );

    let pdf_type = ContentType::parse("application/pdf")
        .map_err(|e| InvoicingError::Internal(format!("Invalid content type: {e}")))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(format!("Invoice {}", email.invoice_number))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(Attachment::new(email.filename.to_string()).body(email.pdf, pdf_type)),
        )
        .map_err(|e| InvoicingError::Email(format!("Failed to build email: {e}")))
}

fn transport(config: &EmailConfig) -> Result<SmtpTransport, InvoicingError> {
    match (&config.username, &config.password) {
        (Some(user), Some(pass)) => Ok(SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| InvoicingError::Email(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(user.clone(), pass.clone()))
            .build()),
        _ => Ok(SmtpTransport::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .build()),
    }
}

/// Reads the persisted PDF and mails it. Blocking; call from `spawn_blocking`.
pub fn send_invoice_pdf(
    config: &EmailConfig,
    to: &str,
    sender_name: Option<&str>,
    invoice_number: &str,
    pdf_path: &Path,
) -> Result<(), InvoicingError> {
    let pdf = std::fs::read(pdf_path).map_err(|e| {
        InvoicingError::Internal(format!("Failed to read {}: {e}", pdf_path.display()))
    })?;
    let filename = pdf_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("invoice.pdf");

    let message = build_invoice_message(
        config,
        InvoiceEmail {
            to,
            sender_name,
            invoice_number,
            filename,
            pdf,
        },
    )?;

    transport(config)?
        .send(&message)
        .map_err(|e| InvoicingError::Email(format!("Failed to send email: {e}")))?;

    log::info!("Emailed invoice {invoice_number} to {to}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".into(),
            smtp_port: 2525,
            username: None,
            password: None,
            from: "billing@example.com".into(),
        }
    }

    #[test]
    fn test_message_carries_pdf_attachment() {
        let message = build_invoice_message(
            &config(),
            InvoiceEmail {
                to: "client@example.org",
                sender_name: Some("Acme Ltd"),
                invoice_number: "INV-4f2a",
                filename: "a1b2c3d4e5f6.pdf",
                pdf: b"%PDF-1.4 fake".to_vec(),
            },
        )
        .expect("message");

        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("Subject: Invoice INV-4f2a"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("a1b2c3d4e5f6.pdf"));
        assert!(raw.contains("Acme Ltd"));
        assert!(raw.contains("client@example.org"));
    }

    #[test]
    fn test_invalid_recipient_is_rejected() {
        let result = build_invoice_message(
            &config(),
            InvoiceEmail {
                to: "not an address",
                sender_name: None,
                invoice_number: "INV-0000",
                filename: "x.pdf",
                pdf: Vec::new(),
            },
        );
        assert!(matches!(result, Err(InvoicingError::Email(_))));
    }

    #[test]
    fn test_missing_pdf_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = send_invoice_pdf(
            &config(),
            "client@example.org",
            None,
            "INV-0000",
            &dir.path().join("missing.pdf"),
        );
        assert!(matches!(result, Err(InvoicingError::Internal(_))));
    }
}
