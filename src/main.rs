use log::error;
use std::process::ExitCode;
use timetable_solver::server;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr = std::env::var("TIMETABLE_ADDR").unwrap_or_else(|_| server::DEFAULT_ADDR.to_string());

    match server::run_server(&addr).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server on {} stopped: {}", addr, e);
            ExitCode::FAILURE
        }
    }
}
