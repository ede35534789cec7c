use std::process::ExitCode;

fn main() -> ExitCode {
    match desktop4mistral::cli::main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {err}");
            ExitCode::FAILURE
        }
    }
}
