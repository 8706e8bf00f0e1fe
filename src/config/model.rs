use std::path::PathBuf;

pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub compress: bool,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub to: Option<String>,
    pub from: Option<String>,
    pub server: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            to: None,
            from: None,
            server: None,
            port: DEFAULT_SMTP_PORT,
            user: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub to: String,
    pub from: String,
    pub server: String,
    pub port: u16,
    pub credentials: Option<(String, String)>,
}

impl MailConfig {
    pub fn settings(&self) -> Option<MailSettings> {
        let credentials = match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        };
        Some(MailSettings {
            to: self.to.clone()?,
            from: self.from.clone()?,
            server: self.server.clone()?,
            port: self.port,
            credentials,
        })
    }
}
