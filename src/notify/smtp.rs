use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailSettings;
use crate::error::NotifyError;
use crate::notify::Notifier;

pub struct SmtpNotifier {
    settings: MailSettings,
}

impl SmtpNotifier {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    fn message(&self, subject: &str, body: &str) -> Result<Message, NotifyError> {
        let from: Mailbox = self.settings.from.parse()?;
        let to: Mailbox = self.settings.to.parse()?;
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        Ok(message)
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = self.message(subject, body)?;
        let mut builder = SmtpTransport::starttls_relay(&self.settings.server)?
            .port(self.settings.port);
        if let Some((user, password)) = &self.settings.credentials {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }
        let mailer = builder.build();
        tracing::debug!(
            "sending mail via {}:{} to {}",
            self.settings.server,
            self.settings.port,
            self.settings.to
        );
        mailer.send(&message)?;
        Ok(())
    }
}
