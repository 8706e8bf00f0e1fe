use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use walkdir::WalkDir;

use crate::backup::archive::{archive_path, tar_args};
use crate::backup::rsync::rsync_args;
use crate::config::Config;
use crate::error::{BackupError, CommandFailure, Result};
use crate::types::RunMode;
use crate::util::command::{format_command, CommandOutput, CommandRunner};

pub mod archive;
pub mod rsync;

const BACKUP_PREFIX: &str = "backup_";

// Runs started within the same second share a backup_dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRun {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub backup_dir: PathBuf,
    pub compress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Mirrored(PathBuf),
    Archived(PathBuf),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupSummary {
    pub files: u64,
    pub bytes: u64,
}

impl BackupRun {
    pub fn new(config: &Config, now: DateTime<Local>) -> Self {
        Self {
            source: config.source.clone(),
            dest: config.dest.clone(),
            backup_dir: config.dest.join(backup_dir_name(now)),
            compress: config.compress,
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        archive_path(&self.backup_dir)
    }
}

pub fn backup_dir_name(now: DateTime<Local>) -> String {
    format!("{}{}", BACKUP_PREFIX, now.format("%Y%m%d_%H%M%S"))
}

pub fn ensure_dest(dest: &Path, run_mode: RunMode) -> std::io::Result<()> {
    if dest.is_dir() {
        return Ok(());
    }
    if run_mode.dry_run {
        tracing::info!("dry-run: mkdir -p {}", dest.display());
        return Ok(());
    }
    tracing::debug!("creating destination {}", dest.display());
    fs::create_dir_all(dest)
}

pub fn run_backup(
    run: &BackupRun,
    runner: &dyn CommandRunner,
    run_mode: RunMode,
) -> Result<BackupOutcome> {
    tracing::info!(
        "Starting backup from {} to {}",
        run.source.display(),
        run.backup_dir.display()
    );

    let args = rsync_args(&run.source, &run.backup_dir);
    run_checked(runner, &args).map_err(BackupError::Sync)?;
    tracing::info!("Rsync completed successfully.");
    if !run_mode.dry_run {
        let summary = summarize(&run.backup_dir);
        tracing::info!(
            "{} holds {} file(s), {} byte(s)",
            run.backup_dir.display(),
            summary.files,
            summary.bytes
        );
    }

    if !run.compress {
        return Ok(BackupOutcome::Mirrored(run.backup_dir.clone()));
    }

    let archive = run.archive_path();
    tracing::info!("Compressing backup to {}", archive.display());
    let args = tar_args(&run.dest, &run.backup_dir);
    run_checked(runner, &args).map_err(BackupError::Compression)?;
    remove_uncompressed(&run.backup_dir, run_mode).map_err(BackupError::Compression)?;
    if !run_mode.dry_run {
        if let Ok(meta) = fs::metadata(&archive) {
            tracing::info!("{} is {} byte(s)", archive.display(), meta.len());
        }
    }
    tracing::info!("Compression completed.");
    Ok(BackupOutcome::Archived(archive))
}

fn run_checked(
    runner: &dyn CommandRunner,
    argv: &[String],
) -> std::result::Result<CommandOutput, CommandFailure> {
    let program = argv.first().cloned().unwrap_or_default();
    let output = runner
        .run(argv)
        .map_err(|e| CommandFailure::spawn(program.as_str(), &e))?;
    if output.success() {
        for line in output.stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::warn!("{}: {}", program, line);
        }
        return Ok(output);
    }
    tracing::error!("{} failed: {}", program, format_command(argv));
    Err(CommandFailure {
        program,
        status: output.status,
        detail: output.stderr,
    })
}

fn remove_uncompressed(
    backup_dir: &Path,
    run_mode: RunMode,
) -> std::result::Result<(), CommandFailure> {
    if run_mode.dry_run {
        tracing::info!("dry-run: rm -rf {}", backup_dir.display());
        return Ok(());
    }
    fs::remove_dir_all(backup_dir)
        .map_err(|e| CommandFailure::spawn(format!("rm -rf {}", backup_dir.display()), &e))
}

pub fn summarize(dir: &Path) -> BackupSummary {
    let mut summary = BackupSummary::default();
    for entry in WalkDir::new(dir).follow_links(false).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        summary.files += 1;
        if let Ok(meta) = entry.metadata() {
            summary.bytes += meta.len();
        }
    }
    summary
}
