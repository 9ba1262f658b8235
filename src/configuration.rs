use crate::slot_generator::SlotConfig;
use std::path::PathBuf;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn business_name(&self) -> String;
    fn service_name(&self) -> String;
    fn password(&self) -> String;
    fn frontend_path(&self) -> PathBuf;
    fn database_url(&self) -> Option<String>;
    fn port(&self) -> String;
    fn slot_config(&self) -> SlotConfig;
    /// Number of days, starting today, that always have inventory and accept
    /// bookings.
    fn booking_window_days(&self) -> u32;
}
