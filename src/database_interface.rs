use crate::schema::{reservations, slots};
use crate::types::{CheckIn, NewReservation, Requester, Reservation, ReservationStats, Slot};
use crate::{
    backend::SlotBackend,
    error::BookingError,
    slot_generator::{new_slots_for, SlotConfig},
};
use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::dsl::exists;
use diesel::{
    Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl,
    SelectableHelper,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

const CREATE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS slots (
        id SERIAL PRIMARY KEY,
        date DATE NOT NULL,
        time VARCHAR(5) NOT NULL,
        capacity INTEGER NOT NULL DEFAULT 1 CHECK (capacity > 0),
        booked INTEGER NOT NULL DEFAULT 0 CHECK (booked >= 0 AND booked <= capacity),
        UNIQUE (date, time)
    );
    CREATE TABLE IF NOT EXISTS reservations (
        id SERIAL PRIMARY KEY,
        full_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        email TEXT NOT NULL,
        appointment_date DATE NOT NULL,
        appointment_time VARCHAR(5) NOT NULL,
        slot_id INTEGER NOT NULL,
        confirmed BOOLEAN NOT NULL DEFAULT FALSE,
        checked_in BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );
    CREATE INDEX IF NOT EXISTS reservations_phone_idx ON reservations (phone);
    CREATE INDEX IF NOT EXISTS reservations_appointment_date_idx ON reservations (appointment_date);
"#;

/// Postgres backend.
#[derive(Clone)]
pub struct DatabaseInterface {
    connection: Arc<Mutex<PgConnection>>,
}

impl DatabaseInterface {
    /// Connects and creates the tables if they are missing.
    pub fn new(database_url: &str) -> Result<Self, BookingError> {
        let mut connection = Self::establish_connection(database_url)?;
        connection.batch_execute(CREATE_TABLES).map_err(|err| {
            error!(?err, "Failed to create tables");
            BookingError::Database(err)
        })?;
        info!("Database schema ready");

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn establish_connection(database_url: &str) -> Result<PgConnection, diesel::ConnectionError> {
        PgConnection::establish(database_url)
    }

    fn connection(&self) -> Result<MutexGuard<'_, PgConnection>, BookingError> {
        self.connection.lock().map_err(|_| {
            let err = "Database connection lock poisoned";
            error!(err);
            BookingError::StorageUnavailable(err.into())
        })
    }
}

impl SlotBackend for DatabaseInterface {
    fn ensure_slots(&self, date: NaiveDate, config: &SlotConfig) -> Result<usize, BookingError> {
        let new_slots = new_slots_for(date, config)?;
        let expected = new_slots.len();
        let mut connection = self.connection()?;

        let result = connection.transaction::<_, BookingError, _>(|conn| {
            let inventory_exists = diesel::select(exists(slots::table.filter(slots::date.eq(date))))
                .get_result::<bool>(conn)?;
            if inventory_exists {
                return Ok(0);
            }

            // A concurrent generator either wrote the whole day (nothing left
            // to insert) or only part of it.
            let inserted = diesel::insert_into(slots::table)
                .values(&new_slots)
                .on_conflict_do_nothing()
                .execute(conn)?;
            if inserted != 0 && inserted != expected {
                return Err(BookingError::GenerationConflict {
                    date,
                    inserted,
                    expected,
                });
            }
            Ok(inserted)
        });

        match &result {
            Ok(created) => debug!(%date, created, "Generated slots"),
            Err(err) => error!(?err, %date, "Slot generation failed"),
        }
        result
    }

    fn claim_first_available(
        &self,
        date: NaiveDate,
        requester: Requester,
    ) -> Result<Reservation, BookingError> {
        let mut connection = self.connection()?;

        connection.transaction::<_, BookingError, _>(|conn| {
            let candidates: Vec<i32> = slots::table
                .filter(slots::date.eq(date))
                .filter(slots::booked.lt(slots::capacity))
                .order(slots::id.asc())
                .select(slots::id)
                .load(conn)?;

            for candidate in candidates {
                // The row lock serialises concurrent claimers; a loser sees the
                // predicate fail and moves on to the next candidate.
                let claimed = diesel::update(
                    slots::table
                        .filter(slots::id.eq(candidate))
                        .filter(slots::booked.lt(slots::capacity)),
                )
                .set(slots::booked.eq(slots::booked + 1))
                .returning(Slot::as_returning())
                .get_result(conn)
                .optional()?;

                let Some(slot) = claimed else {
                    warn!(slot_id = candidate, "Slot was claimed concurrently");
                    continue;
                };

                let reservation = diesel::insert_into(reservations::table)
                    .values(NewReservation::for_slot(&slot, requester))
                    .returning(Reservation::as_returning())
                    .get_result(conn)?;
                return Ok(reservation);
            }

            Err(BookingError::NoCapacity { date })
        })
    }

    fn check_in(&self, reservation_id: i32) -> Result<CheckIn, BookingError> {
        let mut connection = self.connection()?;

        connection.transaction::<_, BookingError, _>(|conn| {
            let updated = diesel::update(
                reservations::table
                    .filter(reservations::id.eq(reservation_id))
                    .filter(reservations::checked_in.eq(false)),
            )
            .set(reservations::checked_in.eq(true))
            .execute(conn)?;
            if updated == 1 {
                return Ok(CheckIn::CheckedIn);
            }

            let known = diesel::select(exists(reservations::table.find(reservation_id)))
                .get_result::<bool>(conn)?;
            if known {
                Ok(CheckIn::AlreadyCheckedIn)
            } else {
                Err(BookingError::NotFound(reservation_id))
            }
        })
    }

    fn slots(&self, date: NaiveDate) -> Result<Vec<Slot>, BookingError> {
        let mut connection = self.connection()?;
        let result = slots::table
            .filter(slots::date.eq(date))
            .order(slots::id.asc())
            .select(Slot::as_select())
            .load(&mut *connection)?;
        Ok(result)
    }

    fn reservations(&self, date: NaiveDate) -> Result<Vec<Reservation>, BookingError> {
        let mut connection = self.connection()?;
        let result = reservations::table
            .filter(reservations::appointment_date.eq(date))
            .order(reservations::id.asc())
            .select(Reservation::as_select())
            .load(&mut *connection)?;
        Ok(result)
    }

    fn reservation_stats(&self, today: NaiveDate) -> Result<ReservationStats, BookingError> {
        let mut connection = self.connection()?;
        let today_booked = reservations::table
            .filter(reservations::appointment_date.eq(today))
            .count()
            .get_result(&mut *connection)?;
        let total_upcoming = reservations::table
            .filter(reservations::appointment_date.ge(today))
            .count()
            .get_result(&mut *connection)?;

        Ok(ReservationStats {
            today_booked,
            total_upcoming,
        })
    }

    fn remove_all(&self) -> Result<(), BookingError> {
        let mut connection = self.connection()?;
        connection.transaction::<_, BookingError, _>(|conn| {
            diesel::delete(reservations::table).execute(conn)?;
            diesel::delete(slots::table).execute(conn)?;
            Ok(())
        })?;
        info!("Cleared all slots and reservations");
        Ok(())
    }
}
