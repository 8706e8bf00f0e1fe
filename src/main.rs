use std::process::ExitCode;

fn main() -> ExitCode {
    mirrorvault::cli::run()
}
