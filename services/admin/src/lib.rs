mod cli;
mod demo;
mod infra;

use jobboard::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
