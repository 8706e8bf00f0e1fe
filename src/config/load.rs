use std::path::PathBuf;

use crate::config::model::{Config, MailConfig, DEFAULT_SMTP_PORT};
use crate::error::ConfigError;

pub const SOURCE_DIR: &str = "SOURCE_DIR";
pub const DEST_DIR: &str = "DEST_DIR";
pub const COMPRESS: &str = "COMPRESS";
pub const EMAIL_TO: &str = "EMAIL_TO";
pub const EMAIL_FROM: &str = "EMAIL_FROM";
pub const SMTP_SERVER: &str = "SMTP_SERVER";
pub const SMTP_PORT: &str = "SMTP_PORT";
pub const SMTP_USER: &str = "SMTP_USER";
pub const SMTP_PASS: &str = "SMTP_PASS";

pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub fn load_config<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let source = required(&lookup, SOURCE_DIR)?;
    let dest = required(&lookup, DEST_DIR)?;
    let compress = lookup(COMPRESS)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let mail = load_mail_config(&lookup)?;
    Ok(Config {
        source: PathBuf::from(source),
        dest: PathBuf::from(dest),
        compress,
        mail,
    })
}

pub fn load_mail_config<F>(lookup: F) -> Result<MailConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let port = match optional(&lookup, SMTP_PORT) {
        Some(value) => value
            .trim()
            .parse::<u16>()
            .map_err(|source| ConfigError::InvalidPort { value, source })?,
        None => DEFAULT_SMTP_PORT,
    };
    Ok(mail_fields(&lookup, port))
}

// A malformed SMTP_PORT falls back to the default port; the other fields stay.
pub fn mail_config_for_report<F>(lookup: F) -> MailConfig
where
    F: Fn(&str) -> Option<String>,
{
    load_mail_config(&lookup).unwrap_or_else(|_| mail_fields(&lookup, DEFAULT_SMTP_PORT))
}

fn mail_fields<F>(lookup: &F, port: u16) -> MailConfig
where
    F: Fn(&str) -> Option<String>,
{
    MailConfig {
        to: optional(lookup, EMAIL_TO),
        from: optional(lookup, EMAIL_FROM),
        server: optional(lookup, SMTP_SERVER),
        port,
        user: optional(lookup, SMTP_USER),
        password: optional(lookup, SMTP_PASS),
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}

// Empty values count as unset.
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}
