use std::process::ExitCode;

fn main() -> ExitCode {
    roomrate_cli::run()
}
