use crate::types::Reservation;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),
}

/// Delivers booking confirmations to the requester.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn send_confirmation(
        &self,
        reservation: &Reservation,
        message: &str,
    ) -> Result<(), NotificationError>;
}

/// Records confirmations in the log instead of sending them anywhere.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_confirmation(
        &self,
        reservation: &Reservation,
        message: &str,
    ) -> Result<(), NotificationError> {
        info!(
            reservation_id = reservation.id,
            email = %reservation.email,
            phone = %reservation.phone,
            text = message,
            "Booking confirmation"
        );
        Ok(())
    }
}

pub fn confirmation_message(service_name: &str, reservation: &Reservation) -> String {
    format!(
        "Hello {}! Your {} is confirmed for {} at {}. Ref: {}",
        reservation.full_name,
        service_name,
        reservation.appointment_date,
        reservation.appointment_time,
        reservation.id
    )
}
