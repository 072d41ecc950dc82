//! Notification dispatch: the abstract mail collaborator.
//!
//! The SMTP wire transport lives outside this crate; everything here talks to
//! the `Mailer` trait, so a real transport can be dropped in behind it.

use async_trait::async_trait;

use crate::config::SmtpConfig;
use crate::error::AppResult;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Records outbound mail through tracing instead of a wire transport. Holds
/// the opaque SMTP settings so a transport-backed mailer can take its place.
pub struct LogMailer {
    smtp: SmtpConfig,
}

impl LogMailer {
    pub fn new(smtp: SmtpConfig) -> Self {
        Self { smtp }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(from = %self.smtp.from, to = %to, subject = %subject, "outbound mail");
        tracing::debug!(body = %body, "outbound mail body");
        Ok(())
    }
}

/// Drops every message. For tests.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> AppResult<()> {
        Ok(())
    }
}
