use std::process::ExitCode;

use locked_fio::FioError;
use locked_fio::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = locked_fio::cli::parse();
    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<FioError>() {
            // FioError messages already embed their causes.
            Some(fe) => {
                out::print_error(&fe.to_string());
                ExitCode::from(fe.code() as u8)
            }
            None => {
                out::print_error(&format!("{e:#}"));
                ExitCode::FAILURE
            }
        },
    }
}
