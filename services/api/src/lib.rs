mod cli;
mod export;
mod infra;
mod routes;
mod server;

use institute_registry::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
