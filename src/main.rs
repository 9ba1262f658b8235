use std::{process::ExitCode, sync::Arc, time::Duration};

use crate::{
    backend::SlotBackend, configuration::Configuration,
    configuration_handler::ConfigurationHandler, database_interface::DatabaseInterface,
    http::create_app, local_slots::LocalSlots,
    notification::{LogNotifier, Notifier},
};
use chrono::Local;
use tokio::{net::TcpListener, time::sleep};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod backend;
mod configuration;
mod configuration_handler;
mod database_interface;
mod error;
mod http;
mod local_slots;
mod notification;
mod schema;
mod slot_generator;
#[cfg(test)]
mod testutils;
mod types;

#[derive(Clone)]
struct AppState<T: SlotBackend, C: Configuration> {
    backend: T,
    configuration: C,
    notifier: Arc<dyn Notifier>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let configuration = ConfigurationHandler::parse_arguments();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        business = %configuration.business_name(),
        service = %configuration.service_name(),
        "Starting appointment manager"
    );

    if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseInterface::new(&database_url) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection. Retry in 1 sec. You may want to restart it with database disabled (in-memory slots).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        serve(backend, configuration).await
    } else {
        info!("No database configured, slots and reservations are kept in memory");
        serve(LocalSlots::default(), configuration).await
    }
}

async fn serve<T: SlotBackend, C: Configuration>(backend: T, configuration: C) -> ExitCode {
    // Every bookable date (today up to the end of the window) gets its
    // inventory before the first request is accepted.
    let today = Local::now().date_naive();
    let days = configuration.booking_window_days() + 1;
    match backend.ensure_booking_window(today, days, &configuration.slot_config()) {
        Ok(created) => info!(created, days, "Slot inventory ready"),
        Err(err) => {
            error!(?err, "Failed to generate slot inventory");
            return ExitCode::FAILURE;
        }
    }

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(?err, %address, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!("Accessible at {address}");

    let app = create_app(backend, configuration, Arc::new(LogNotifier));
    if let Err(err) = axum::serve(listener, app).await {
        error!(?err, "Server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
