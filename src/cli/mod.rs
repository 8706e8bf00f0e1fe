use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::backup::{ensure_dest, run_backup, BackupOutcome, BackupRun};
use crate::cli::args::Cli;
use crate::config::{env_lookup, load_config, mail_config_for_report, Config, MailConfig};
use crate::notify::{notify_failure, Delivery};
use crate::types::RunMode;
use crate::util::command::{CommandRunner, SystemRunner};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

pub mod args;

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let run_mode = cli.run_mode();
    init_tracing(run_mode);
    tracing::debug!("mirrorvault {}", VERSION);
    let runner = SystemRunner::new(run_mode);
    ExitCode::from(run_with(&cli, env_lookup, &runner, notify_failure))
}

pub fn run_with<F, N>(cli: &Cli, lookup: F, runner: &dyn CommandRunner, notify: N) -> u8
where
    F: Fn(&str) -> Option<String>,
    N: FnOnce(&MailConfig, &str) -> Delivery,
{
    let run_mode = cli.run_mode();
    let config = match load_config(&lookup) {
        Ok(config) => config,
        Err(err) => {
            let err = anyhow::Error::new(err).context("load configuration");
            if cli.print_config {
                tracing::error!("{:#}", err);
                return EXIT_FAILURE;
            }
            let mail = mail_config_for_report(&lookup);
            return fail(&mail, err, run_mode, notify);
        }
    };

    if cli.print_config {
        print_config(&config);
        return EXIT_OK;
    }

    match execute(&config, runner, run_mode) {
        Ok(outcome) => {
            let path = match &outcome {
                BackupOutcome::Mirrored(path) | BackupOutcome::Archived(path) => path,
            };
            tracing::info!("Backup completed successfully: {}", path.display());
            EXIT_OK
        }
        Err(err) => fail(&config.mail, err, run_mode, notify),
    }
}

fn execute(config: &Config, runner: &dyn CommandRunner, run_mode: RunMode) -> Result<BackupOutcome> {
    ensure_dest(&config.dest, run_mode)
        .with_context(|| format!("create {}", config.dest.display()))?;
    let run = BackupRun::new(config, Local::now());
    let outcome = run_backup(&run, runner, run_mode)?;
    Ok(outcome)
}

// The original error decides the exit status; the delivery outcome is only logged.
fn fail<N>(mail: &MailConfig, err: anyhow::Error, run_mode: RunMode, notify: N) -> u8
where
    N: FnOnce(&MailConfig, &str) -> Delivery,
{
    let message = format!("{:#}", err);
    tracing::error!("Backup failed: {}", message);
    if run_mode.dry_run {
        match mail.settings() {
            Some(settings) => tracing::info!(
                "dry-run: would mail {} via {}:{}: {}",
                settings.to,
                settings.server,
                settings.port,
                message
            ),
            None => tracing::info!("dry-run: email configuration incomplete; no mail"),
        }
        return EXIT_FAILURE;
    }
    let delivery = notify(mail, &message);
    tracing::debug!("notification: {:?}", delivery);
    EXIT_FAILURE
}

fn print_config(config: &Config) {
    let run = BackupRun::new(config, Local::now());
    let mail = &config.mail;
    let unset = || "<unset>".to_string();
    println!("source: {}", config.source.display());
    println!("dest: {}", config.dest.display());
    println!("compress: {}", config.compress);
    if config.compress {
        println!("  next archive: {}", run.archive_path().display());
    } else {
        println!("  next backup dir: {}", run.backup_dir.display());
    }
    println!("mail:");
    println!("  to: {}", mail.to.clone().unwrap_or_else(unset));
    println!("  from: {}", mail.from.clone().unwrap_or_else(unset));
    println!(
        "  relay: {}:{}",
        mail.server.clone().unwrap_or_else(unset),
        mail.port
    );
    println!("  user: {}", mail.user.clone().unwrap_or_else(unset));
    println!(
        "  password: {}",
        if mail.password.is_some() { "<redacted>" } else { "<unset>" }
    );
    if mail.settings().is_none() {
        println!("  notifications disabled (need to, from and relay)");
    }
}

fn init_tracing(run_mode: RunMode) {
    let level = if run_mode.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load::{DEST_DIR, EMAIL_FROM, EMAIL_TO, SMTP_PORT, SMTP_SERVER, SOURCE_DIR};
    use crate::util::command::CommandOutput;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;
    use tempfile::TempDir;

    struct StatusRunner {
        status: i32,
        calls: RefCell<Vec<String>>,
    }

    impl StatusRunner {
        fn new(status: i32) -> Self {
            Self {
                status,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for StatusRunner {
        fn run(&self, argv: &[String]) -> io::Result<CommandOutput> {
            self.calls.borrow_mut().push(argv[0].clone());
            Ok(CommandOutput {
                status: Some(self.status),
                stderr: if self.status == 0 { String::new() } else { "rsync error".to_string() },
            })
        }
    }

    fn env(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn mail_vars() -> Vec<(&'static str, String)> {
        vec![
            (EMAIL_TO, "ops@example.com".to_string()),
            (EMAIL_FROM, "backup@example.com".to_string()),
            (SMTP_SERVER, "127.0.0.1".to_string()),
        ]
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["mirrorvault"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parse")
    }

    fn run_recording(
        cli: &Cli,
        vars: &[(&str, String)],
        runner: &dyn CommandRunner,
        delivery: Delivery,
    ) -> (u8, Vec<(MailConfig, String)>) {
        let sent = RefCell::new(Vec::new());
        let code = run_with(cli, env(vars), runner, |mail: &MailConfig, message: &str| {
            sent.borrow_mut().push((mail.clone(), message.to_string()));
            delivery
        });
        (code, sent.into_inner())
    }

    #[test]
    fn missing_source_notifies_once_and_exits_one() {
        let runner = StatusRunner::new(0);
        let (code, sent) = run_recording(&cli(&[]), &mail_vars(), &runner, Delivery::Sent);
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.to.as_deref(), Some("ops@example.com"));
        assert!(sent[0].1.contains("SOURCE_DIR is not set"), "{}", sent[0].1);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn malformed_port_still_notifies_relay() {
        let mut vars = mail_vars();
        vars.push((SMTP_PORT, "smtp".to_string()));
        vars.push((SOURCE_DIR, "/srv/data".to_string()));
        vars.push((DEST_DIR, "/backup".to_string()));
        let (code, sent) = run_recording(&cli(&[]), &vars, &StatusRunner::new(0), Delivery::Sent);
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].0.settings().is_some());
        assert!(sent[0].1.contains("SMTP_PORT"));
    }

    #[test]
    fn sync_failure_notifies_once_and_exits_one() {
        let dest = TempDir::new().expect("tempdir");
        let mut vars = mail_vars();
        vars.push((SOURCE_DIR, "/srv/data".to_string()));
        vars.push((DEST_DIR, dest.path().to_string_lossy().into_owned()));
        let runner = StatusRunner::new(23);
        let (code, sent) = run_recording(&cli(&[]), &vars, &runner, Delivery::Sent);
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.starts_with("sync failed: rsync exited with status 23"), "{}", sent[0].1);
        assert_eq!(*runner.calls.borrow(), vec!["rsync".to_string()]);
    }

    #[test]
    fn failed_delivery_keeps_exit_status() {
        let (code, sent) = run_recording(&cli(&[]), &mail_vars(), &StatusRunner::new(0), Delivery::Failed);
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(sent.len(), 1);
    }

    #[test]
    fn success_exits_zero_without_mail() {
        let dest = TempDir::new().expect("tempdir");
        let mut vars = mail_vars();
        vars.push((SOURCE_DIR, "/srv/data".to_string()));
        vars.push((DEST_DIR, dest.path().join("nested").to_string_lossy().into_owned()));
        let (code, sent) = run_recording(&cli(&[]), &vars, &StatusRunner::new(0), Delivery::Sent);
        assert_eq!(code, EXIT_OK);
        assert!(sent.is_empty());
        assert!(dest.path().join("nested").is_dir());
    }

    #[test]
    fn dry_run_and_print_config_never_mail() {
        for flag in ["--dry-run", "--print-config"] {
            let (code, sent) =
                run_recording(&cli(&[flag]), &mail_vars(), &StatusRunner::new(0), Delivery::Sent);
            assert_eq!(code, EXIT_FAILURE, "{}", flag);
            assert!(sent.is_empty(), "{}", flag);
        }
    }

    #[test]
    fn dry_run_sync_failure_never_mails() {
        let dest = TempDir::new().expect("tempdir");
        let mut vars = mail_vars();
        vars.push((SOURCE_DIR, "/srv/data".to_string()));
        vars.push((DEST_DIR, dest.path().to_string_lossy().into_owned()));
        let (code, sent) =
            run_recording(&cli(&["--dry-run"]), &vars, &StatusRunner::new(23), Delivery::Sent);
        assert_eq!(code, EXIT_FAILURE);
        assert!(sent.is_empty());
    }
}
