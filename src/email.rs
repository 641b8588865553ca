//! Outbound delivery of verification codes.
//!
//! The service only ever talks to [`EmailDispatch`], so the SMTP-backed
//! mailer, the logging stand-in used when sending is disabled, and the
//! recording double used by tests are interchangeable.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::{debug, instrument};

use markpad_config::SmtpConfig;

use crate::verification::Purpose;

/// Errors raised while composing or handing off a verification email.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A sender or recipient address failed to parse.
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    /// The SMTP relay rejected the connection or the message.
    #[error("smtp transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The blocking send task was cancelled or panicked.
    #[error("email task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The dispatcher refused to take the message.
    #[error("delivery refused: {0}")]
    Refused(String),
}

/// Delivery seam for verification codes.
#[async_trait]
pub trait EmailDispatch: Send + Sync {
    /// Delivers `code` to `to_email` for the given purpose.
    async fn send_verification_code(
        &self,
        to_email: &str,
        purpose: Purpose,
        code: &str,
    ) -> Result<(), DispatchError>;
}

/// Picks the dispatch implementation the configuration calls for.
///
/// Returns the SMTP-backed mailer when sending is enabled and the logging
/// [`NullMailer`] otherwise, so local development works without a relay.
pub fn mailer_from_config(config: SmtpConfig) -> Arc<dyn EmailDispatch> {
    if config.enabled {
        Arc::new(SmtpMailer::new(config))
    } else {
        Arc::new(NullMailer)
    }
}

/// SMTP-backed mailer for verification codes.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn subject_for(purpose: Purpose) -> &'static str {
        match purpose {
            Purpose::Registration => "Your Markpad registration code",
            Purpose::PasswordReset => "Your Markpad password reset code",
        }
    }

    fn action_for(purpose: Purpose) -> &'static str {
        match purpose {
            Purpose::Registration => "finish registering your account",
            Purpose::PasswordReset => "reset your password",
        }
    }

    fn code_template(&self, action: &str, code: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Verification Code</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
                    <tr>
                        <td style="background-color: #4F46E5; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">Markpad</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px; line-height: 1.5;">
                                Hello,
                            </p>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px; line-height: 1.5;">
                                Thanks for using Markpad. Use the code below to {}:
                            </p>
                            <div style="background-color: #f5f5f5; padding: 15px; margin: 15px 0; text-align: center; font-size: 24px; font-weight: bold; letter-spacing: 5px; color: #4F46E5;">
                                {}
                            </div>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 14px; line-height: 1.5;">
                                <strong>The code is valid for 10 minutes.</strong>
                            </p>
                            <p style="margin: 0; color: #666666; font-size: 14px; line-height: 1.5;">
                                If you didn't request this code, you can safely ignore this email.
                            </p>
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from Markpad. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
            action, code
        )
    }
}

#[async_trait]
impl EmailDispatch for SmtpMailer {
    #[instrument(skip(self, code))]
    async fn send_verification_code(
        &self,
        to_email: &str,
        purpose: Purpose,
        code: &str,
    ) -> Result<(), DispatchError> {
        let action = Self::action_for(purpose);
        let html_body = self.code_template(action, code);
        let text_body = format!(
            "Hello,\n\n\
             Thanks for using Markpad. Use the code below to {}:\n\n\
             {}\n\n\
             The code is valid for 10 minutes.\n\n\
             If you didn't request this code, you can safely ignore this email.\n\n\
             Best regards,\n\
             The Markpad Team",
            action, code
        );

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(from.parse()?)
            .to(to_email.parse()?)
            .subject(Self::subject_for(purpose))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email)).await??;

        debug!(to_email, purpose = %purpose, "verification email sent");
        Ok(())
    }
}

/// Dispatch used when SMTP sending is disabled.
///
/// Logs the would-be delivery and reports success; in local development the
/// log line is the delivery channel.
pub struct NullMailer;

#[async_trait]
impl EmailDispatch for NullMailer {
    async fn send_verification_code(
        &self,
        to_email: &str,
        purpose: Purpose,
        code: &str,
    ) -> Result<(), DispatchError> {
        debug!(to_email, purpose = %purpose, code, "smtp disabled; verification email not sent");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use recording::{RecordingMailer, SentCode};

#[cfg(any(test, feature = "test-utils"))]
mod recording {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// One captured delivery.
    #[derive(Debug, Clone)]
    pub struct SentCode {
        pub to_email: String,
        pub purpose: Purpose,
        pub code: String,
    }

    /// Test double that captures every dispatched code instead of sending it,
    /// and can be told to refuse deliveries.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<SentCode>>,
        fail: AtomicBool,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent delivery fail (or succeed again).
        pub fn set_fail(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        /// Everything dispatched so far, oldest first.
        pub fn sent(&self) -> Vec<SentCode> {
            self.sent.lock().expect("mailer log poisoned").clone()
        }

        /// The most recent code dispatched to `email`, if any.
        pub fn last_code_for(&self, email: &str) -> Option<String> {
            self.sent()
                .into_iter()
                .rev()
                .find(|s| s.to_email == email)
                .map(|s| s.code)
        }
    }

    #[async_trait]
    impl EmailDispatch for RecordingMailer {
        async fn send_verification_code(
            &self,
            to_email: &str,
            purpose: Purpose,
            code: &str,
        ) -> Result<(), DispatchError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DispatchError::Refused("recording mailer set to fail".into()));
            }

            self.sent.lock().expect("mailer log poisoned").push(SentCode {
                to_email: to_email.to_owned(),
                purpose,
                code: code.to_owned(),
            });
            Ok(())
        }
    }
}
