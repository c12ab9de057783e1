mod cli;
mod infra;
mod preview;
mod routes;
mod server;

use staff_boarding::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
