use chrono::Local;

use crate::config::{MailConfig, MailSettings};
use crate::error::NotifyError;
use crate::notify::smtp::SmtpNotifier;

pub mod smtp;

pub const FAILURE_SUBJECT: &str = "Backup Service Failure Alert";

pub trait Notifier {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
    Failed,
}

pub fn failure_body(error_msg: &str) -> String {
    format!(
        "Backup failed at {}: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
        error_msg
    )
}

// `connect` only runs when recipient, sender and relay are all set.
pub fn try_notify<N, F>(mail: &MailConfig, error_msg: &str, connect: F) -> Result<Delivery, NotifyError>
where
    N: Notifier,
    F: FnOnce(MailSettings) -> N,
{
    let Some(settings) = mail.settings() else {
        return Ok(Delivery::Skipped);
    };
    let notifier = connect(settings);
    notifier.send(FAILURE_SUBJECT, &failure_body(error_msg))?;
    Ok(Delivery::Sent)
}

pub fn notify_failure(mail: &MailConfig, error_msg: &str) -> Delivery {
    report(try_notify(mail, error_msg, SmtpNotifier::new))
}

fn report(result: Result<Delivery, NotifyError>) -> Delivery {
    match result {
        Ok(Delivery::Sent) => {
            tracing::info!("Error notification email sent.");
            Delivery::Sent
        }
        Ok(skipped) => {
            tracing::warn!("Email configuration incomplete; skipping notification.");
            skipped
        }
        Err(err) => {
            tracing::error!("Failed to send email: {}", err);
            Delivery::Failed
        }
    }
}
