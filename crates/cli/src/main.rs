use std::process::ExitCode;

fn main() -> ExitCode {
    fleura_cli::run()
}
