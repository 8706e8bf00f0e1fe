use std::io;
use std::process::{Command, Stdio};

use crate::types::RunMode;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

// argv[0] is the program.
pub trait CommandRunner {
    fn run(&self, argv: &[String]) -> io::Result<CommandOutput>;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    run_mode: RunMode,
}

impl SystemRunner {
    pub fn new(run_mode: RunMode) -> Self {
        Self { run_mode }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> io::Result<CommandOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        if self.run_mode.dry_run {
            tracing::info!("dry-run: {}", format_command(argv));
            return Ok(CommandOutput {
                status: Some(0),
                ..CommandOutput::default()
            });
        }
        if self.run_mode.verbose {
            tracing::info!("{}", format_command(argv));
        }
        // stdout streams straight through; stderr is kept for the failure report.
        let output = Command::new(program)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub fn format_command(argv: &[String]) -> String {
    argv.join(" ")
}
