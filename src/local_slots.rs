use crate::{
    backend::SlotBackend,
    error::BookingError,
    slot_generator::{new_slots_for, SlotConfig},
    types::{CheckIn, NewReservation, Requester, Reservation, ReservationStats, Slot},
};
use chrono::{NaiveDate, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};

#[derive(Debug, Default)]
struct Store {
    slots: Vec<Slot>,
    reservations: Vec<Reservation>,
    last_slot_id: i32,
    last_reservation_id: i32,
}

/// In-memory backend. Slots and reservations share one lock, so every claim
/// is a single critical section.
#[derive(Debug, Clone, Default)]
pub struct LocalSlots {
    store: Arc<Mutex<Store>>,
}

impl LocalSlots {
    fn store(&self) -> Result<MutexGuard<'_, Store>, BookingError> {
        self.store.lock().map_err(|_| {
            let err = "In-memory slot store lock poisoned";
            error!(err);
            BookingError::StorageUnavailable(err.into())
        })
    }
}

impl SlotBackend for LocalSlots {
    fn ensure_slots(&self, date: NaiveDate, config: &SlotConfig) -> Result<usize, BookingError> {
        let new_slots = new_slots_for(date, config)?;
        let mut store = self.store()?;

        if store.slots.iter().any(|slot| slot.date == date) {
            return Ok(0);
        }

        let created = new_slots.len();
        for new_slot in new_slots {
            store.last_slot_id += 1;
            let id = store.last_slot_id;
            store.slots.push(Slot {
                id,
                date: new_slot.date,
                time: new_slot.time,
                capacity: new_slot.capacity,
                booked: new_slot.booked,
            });
        }
        debug!(%date, created, "Generated slots");
        Ok(created)
    }

    fn claim_first_available(
        &self,
        date: NaiveDate,
        requester: Requester,
    ) -> Result<Reservation, BookingError> {
        let mut store = self.store()?;

        // slots are appended in id order
        let Some(slot) = store
            .slots
            .iter_mut()
            .find(|slot| slot.date == date && slot.is_available())
        else {
            return Err(BookingError::NoCapacity { date });
        };
        slot.booked += 1;
        let new_reservation = NewReservation::for_slot(slot, requester);

        store.last_reservation_id += 1;
        let reservation = Reservation {
            id: store.last_reservation_id,
            full_name: new_reservation.full_name,
            phone: new_reservation.phone,
            email: new_reservation.email,
            appointment_date: new_reservation.appointment_date,
            appointment_time: new_reservation.appointment_time,
            slot_id: new_reservation.slot_id,
            confirmed: new_reservation.confirmed,
            checked_in: false,
            created_at: Utc::now(),
        };
        store.reservations.push(reservation.clone());
        Ok(reservation)
    }

    fn check_in(&self, reservation_id: i32) -> Result<CheckIn, BookingError> {
        let mut store = self.store()?;
        let reservation = store
            .reservations
            .iter_mut()
            .find(|reservation| reservation.id == reservation_id)
            .ok_or(BookingError::NotFound(reservation_id))?;

        if reservation.checked_in {
            return Ok(CheckIn::AlreadyCheckedIn);
        }
        reservation.checked_in = true;
        Ok(CheckIn::CheckedIn)
    }

    fn slots(&self, date: NaiveDate) -> Result<Vec<Slot>, BookingError> {
        Ok(self
            .store()?
            .slots
            .iter()
            .filter(|slot| slot.date == date)
            .cloned()
            .collect())
    }

    fn reservations(&self, date: NaiveDate) -> Result<Vec<Reservation>, BookingError> {
        Ok(self
            .store()?
            .reservations
            .iter()
            .filter(|reservation| reservation.appointment_date == date)
            .cloned()
            .collect())
    }

    fn reservation_stats(&self, today: NaiveDate) -> Result<ReservationStats, BookingError> {
        let store = self.store()?;
        let mut stats = ReservationStats::default();
        for reservation in &store.reservations {
            if reservation.appointment_date == today {
                stats.today_booked += 1;
            }
            if reservation.appointment_date >= today {
                stats.total_upcoming += 1;
            }
        }
        Ok(stats)
    }

    fn remove_all(&self) -> Result<(), BookingError> {
        let mut store = self.store()?;
        store.slots.clear();
        store.reservations.clear();
        Ok(())
    }
}
