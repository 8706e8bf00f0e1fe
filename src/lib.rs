pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod types;
pub mod util;

pub use backup::{run_backup, BackupOutcome, BackupRun};
pub use config::{load_config, Config, MailConfig};
pub use error::{BackupError, ConfigError, NotifyError, Result};
pub use types::RunMode;
