pub mod load;
pub mod model;

pub use load::{env_lookup, load_config, load_mail_config, mail_config_for_report};
pub use model::{Config, MailConfig, MailSettings};
