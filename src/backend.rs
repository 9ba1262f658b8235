use crate::error::BookingError;
use crate::slot_generator::SlotConfig;
use crate::types::{CheckIn, Requester, Reservation, ReservationStats, Slot};
use chrono::{Days, NaiveDate};
use tracing::{debug, info};

pub trait SlotBackend: Clone + Send + Sync + 'static {
    /// Creates the day's inventory unless at least one slot already exists for
    /// `date`. Returns how many slots were created.
    fn ensure_slots(&self, date: NaiveDate, config: &SlotConfig) -> Result<usize, BookingError>;

    /// Atomically takes one unit of capacity from the lowest-id free slot of
    /// `date` and records the reservation for it.
    fn claim_first_available(
        &self,
        date: NaiveDate,
        requester: Requester,
    ) -> Result<Reservation, BookingError>;

    fn check_in(&self, reservation_id: i32) -> Result<CheckIn, BookingError>;
    fn slots(&self, date: NaiveDate) -> Result<Vec<Slot>, BookingError>;
    fn reservations(&self, date: NaiveDate) -> Result<Vec<Reservation>, BookingError>;
    fn reservation_stats(&self, today: NaiveDate) -> Result<ReservationStats, BookingError>;
    fn remove_all(&self) -> Result<(), BookingError>;

    fn assign_booking(
        &self,
        date: NaiveDate,
        requester: Requester,
        config: &SlotConfig,
    ) -> Result<Reservation, BookingError> {
        self.ensure_slots(date, config)?;
        let reservation = self.claim_first_available(date, requester)?;
        info!(
            reservation_id = reservation.id,
            slot_id = reservation.slot_id,
            %date,
            time = %reservation.appointment_time,
            "Booking assigned"
        );
        Ok(reservation)
    }

    /// Generates inventory for `days` consecutive dates starting at `from`,
    /// stopping at the first failure.
    fn ensure_booking_window(
        &self,
        from: NaiveDate,
        days: u32,
        config: &SlotConfig,
    ) -> Result<usize, BookingError> {
        let mut created = 0;
        for offset in 0..days {
            let date = from
                .checked_add_days(Days::new(offset.into()))
                .ok_or_else(|| {
                    BookingError::InvalidConfiguration(format!(
                        "booking window overflows the calendar at {from} + {offset} days"
                    ))
                })?;
            created += self.ensure_slots(date, config)?;
        }
        debug!(%from, days, created, "Booking window prepared");
        Ok(created)
    }
}
