use crate::configuration::Configuration;
use crate::slot_generator::SlotConfig;
use clap::Parser;
use std::path::PathBuf;

/// Appointment booking service
#[derive(Debug, Clone, Parser)]
#[command(version)]
pub struct ConfigurationHandler {
    #[arg(long, env = "BUSINESS_NAME", default_value = "Zero Queue")]
    pub business_name: String,

    #[arg(long, env = "SERVICE_NAME", default_value = "Appointment")]
    pub service_name: String,

    /// Value expected in the `x-admin-password` header of admin requests
    #[arg(long, env = "ADMIN_PASSWORD")]
    pub admin_password: String,

    #[arg(long, env = "FRONTEND_PATH", default_value = "frontend/index.html")]
    pub frontend_path: PathBuf,

    /// Keep slots and reservations in memory when omitted
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: String,

    #[arg(long, env = "SLOT_DURATION_MINUTES", default_value_t = 30)]
    pub slot_duration_minutes: u32,

    #[arg(long, env = "WORKING_HOURS_START", default_value_t = 9)]
    pub working_hours_start: u32,

    #[arg(long, env = "WORKING_HOURS_END", default_value_t = 17)]
    pub working_hours_end: u32,

    #[arg(long, env = "SLOT_CAPACITY", default_value_t = 1)]
    pub slot_capacity: u32,

    #[arg(long, env = "BOOKING_WINDOW_DAYS", default_value_t = 30)]
    pub booking_window_days: u32,
}

impl ConfigurationHandler {
    /// Reads `.env` (if present) and then the command line.
    pub fn parse_arguments() -> Self {
        // a missing .env is fine
        dotenvy::dotenv().ok();
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn business_name(&self) -> String {
        self.business_name.clone()
    }

    fn service_name(&self) -> String {
        self.service_name.clone()
    }

    fn password(&self) -> String {
        self.admin_password.clone()
    }

    fn frontend_path(&self) -> PathBuf {
        self.frontend_path.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn slot_config(&self) -> SlotConfig {
        SlotConfig {
            slot_duration_minutes: self.slot_duration_minutes,
            working_hours_start: self.working_hours_start,
            working_hours_end: self.working_hours_end,
            capacity: self.slot_capacity,
        }
    }

    fn booking_window_days(&self) -> u32 {
        self.booking_window_days
    }
}
