use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use chrono::{NaiveDate, Utc};

use crate::{
    backend::SlotBackend,
    configuration_handler::ConfigurationHandler,
    error::BookingError,
    slot_generator::SlotConfig,
    types::{CheckIn, Requester, Reservation, ReservationStats, Slot},
};

pub const ADMIN_PASSWORD: &str = "123";

pub fn requester(full_name: &str) -> Requester {
    Requester {
        full_name: full_name.into(),
        phone: "+43 660 1234567".into(),
        email: "guest@example.com".into(),
    }
}

pub fn reservation(id: i32, full_name: &str, time: &str) -> Reservation {
    Reservation {
        id,
        full_name: full_name.into(),
        phone: "+43 660 1234567".into(),
        email: "guest@example.com".into(),
        appointment_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        appointment_time: time.into(),
        slot_id: id,
        confirmed: true,
        checked_in: false,
        created_at: Utc::now(),
    }
}

pub fn test_configuration(slot_config: SlotConfig) -> ConfigurationHandler {
    ConfigurationHandler {
        business_name: "Test Office".into(),
        service_name: "Passport Renewal".into(),
        admin_password: ADMIN_PASSWORD.into(),
        frontend_path: PathBuf::from("frontend/index.html"),
        database_url: None,
        port: "0".into(),
        slot_duration_minutes: slot_config.slot_duration_minutes,
        working_hours_start: slot_config.working_hours_start,
        working_hours_end: slot_config.working_hours_end,
        slot_capacity: slot_config.capacity,
        booking_window_days: 30,
    }
}

pub struct MockSlotBackendInner {
    pub success: AtomicBool,
    pub calls_to_ensure_slots: AtomicU64,
    pub calls_to_claim_first_available: AtomicU64,
    pub calls_to_check_in: AtomicU64,
    pub calls_to_slots: AtomicU64,
    pub calls_to_reservations: AtomicU64,
    pub calls_to_reservation_stats: AtomicU64,
    pub calls_to_remove_all: AtomicU64,
}

#[derive(Clone)]
pub struct MockSlotBackend(pub Arc<MockSlotBackendInner>);

impl MockSlotBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls_to_ensure_slots: AtomicU64::default(),
            calls_to_claim_first_available: AtomicU64::default(),
            calls_to_check_in: AtomicU64::default(),
            calls_to_slots: AtomicU64::default(),
            calls_to_reservations: AtomicU64::default(),
            calls_to_reservation_stats: AtomicU64::default(),
            calls_to_remove_all: AtomicU64::default(),
        }
    }
}

impl MockSlotBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockSlotBackendInner::new()))
    }

    fn result(&self) -> Result<(), BookingError> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BookingError::StorageUnavailable("Supposed to fail".into())),
        }
    }
}

impl SlotBackend for MockSlotBackend {
    fn ensure_slots(&self, _date: NaiveDate, _config: &SlotConfig) -> Result<usize, BookingError> {
        self.0.calls_to_ensure_slots.fetch_add(1, Ordering::SeqCst);
        self.result().map(|()| 0)
    }

    fn claim_first_available(
        &self,
        date: NaiveDate,
        requester: Requester,
    ) -> Result<Reservation, BookingError> {
        self.0
            .calls_to_claim_first_available
            .fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(Reservation {
            appointment_date: date,
            ..reservation(1, &requester.full_name, "08:00")
        })
    }

    fn check_in(&self, _reservation_id: i32) -> Result<CheckIn, BookingError> {
        self.0.calls_to_check_in.fetch_add(1, Ordering::SeqCst);
        self.result().map(|()| CheckIn::CheckedIn)
    }

    fn slots(&self, _date: NaiveDate) -> Result<Vec<Slot>, BookingError> {
        self.0.calls_to_slots.fetch_add(1, Ordering::SeqCst);
        self.result().map(|()| vec![])
    }

    fn reservations(&self, _date: NaiveDate) -> Result<Vec<Reservation>, BookingError> {
        self.0.calls_to_reservations.fetch_add(1, Ordering::SeqCst);
        self.result().map(|()| vec![])
    }

    fn reservation_stats(&self, _today: NaiveDate) -> Result<ReservationStats, BookingError> {
        self.0
            .calls_to_reservation_stats
            .fetch_add(1, Ordering::SeqCst);
        self.result().map(|()| ReservationStats::default())
    }

    fn remove_all(&self) -> Result<(), BookingError> {
        self.0.calls_to_remove_all.fetch_add(1, Ordering::SeqCst);
        self.result()
    }
}
