mod cli;
mod infra;
mod review;
mod routes;
mod server;

use applicant_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
