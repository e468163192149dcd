use std::process::ExitCode;

fn main() -> ExitCode {
    webforge_cli::run()
}
