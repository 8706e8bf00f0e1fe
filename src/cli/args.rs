use clap::Parser;

use crate::types::RunMode;

/// Mirror SOURCE_DIR into DEST_DIR/backup_<timestamp> with rsync.
///
/// Configuration comes from the environment: SOURCE_DIR, DEST_DIR, COMPRESS,
/// EMAIL_TO, EMAIL_FROM, SMTP_SERVER, SMTP_PORT, SMTP_USER, SMTP_PASS.
#[derive(Parser, Debug)]
#[command(name = "mirrorvault", version)]
pub struct Cli {
    /// Log commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
    /// Log every command line and its output
    #[arg(long, short = 'v')]
    pub verbose: bool,
    /// Print the resolved configuration and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    pub fn run_mode(&self) -> RunMode {
        RunMode {
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }
}
