//! Email notification delivery via SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport to send plain-text
//! notification emails on moderation transitions. Configuration is loaded
//! from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and no mailer is constructed.
//!
//! Dispatch is fire-and-forget: every public method returns a `bool`
//! success indicator and swallows errors internally, so a retry queue can
//! be added behind the same interface without changing callers.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures. Internal to this module: the
/// public interface logs and returns `false` instead.
#[derive(Debug, thiserror::Error)]
enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@postbox.local";

/// Configuration for the SMTP email dispatcher.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                  |
    /// |-----------------|----------|--------------------------|
    /// | `SMTP_HOST`     | yes      | —                        |
    /// | `SMTP_PORT`     | no       | `587`                    |
    /// | `SMTP_FROM`     | no       | `noreply@postbox.local`  |
    /// | `SMTP_USER`     | no       | —                        |
    /// | `SMTP_PASSWORD` | no       | —                        |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends moderation notification emails via SMTP, best-effort.
pub struct Mailer {
    config: EmailConfig,
}

impl Mailer {
    /// Create a new mailer with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Notify a submitter that an admin replied to their submission.
    ///
    /// Returns whether the email was handed to the SMTP server. Failures
    /// are logged and never propagated.
    pub async fn send_admin_reply(&self, to_email: &str, name: Option<&str>, reply: &str) -> bool {
        let greeting = name.unwrap_or("there");
        let body = format!(
            "Hi {greeting},\n\nThanks for writing in! Here is our reply:\n\n{reply}\n"
        );
        self.dispatch(to_email, "We replied to your message", body)
            .await
    }

    /// Notify an applicant that their sponsor application was decided.
    pub async fn send_application_decision(
        &self,
        to_email: &str,
        company_name: &str,
        approved: bool,
    ) -> bool {
        let (subject, body) = if approved {
            (
                "Your sponsorship application was approved",
                format!(
                    "Hi {company_name} team,\n\nGreat news: your sponsorship \
                     application has been approved. We will be in touch about \
                     next steps shortly.\n"
                ),
            )
        } else {
            (
                "Your sponsorship application",
                format!(
                    "Hi {company_name} team,\n\nThank you for applying. \
                     Unfortunately we are not able to take your sponsorship \
                     forward at this time.\n"
                ),
            )
        };
        self.dispatch(to_email, subject, body).await
    }

    /// Build, connect, and send. All failure modes collapse to `false`.
    async fn dispatch(&self, to_email: &str, subject: &str, body: String) -> bool {
        match self.try_dispatch(to_email, subject, body).await {
            Ok(()) => {
                tracing::info!(to = to_email, subject, "Notification email sent");
                true
            }
            Err(e) => {
                tracing::error!(to = to_email, subject, error = %e, "Notification email failed");
                false
            }
        }
    }

    async fn try_dispatch(
        &self,
        to_email: &str,
        subject: &str,
        body: String,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
