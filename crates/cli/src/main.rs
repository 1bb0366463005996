use std::process::ExitCode;

fn main() -> ExitCode {
    bookly_cli::run()
}
