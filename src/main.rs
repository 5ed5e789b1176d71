use std::process::ExitCode;

fn main() -> ExitCode {
    match chatwarden::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
