mod cli;
mod infra;
mod routes;
mod server;

use makan_index::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
