use crate::schema::{reservations, slots};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = slots)]
pub struct Slot {
    pub id: i32,
    pub date: NaiveDate,
    pub time: String,
    pub capacity: i32,
    pub booked: i32,
}

impl Slot {
    pub fn is_available(&self) -> bool {
        self.booked < self.capacity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = slots)]
pub struct NewSlot {
    pub date: NaiveDate,
    pub time: String,
    pub capacity: i32,
    pub booked: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = reservations)]
pub struct Reservation {
    pub id: i32,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub slot_id: i32,
    pub confirmed: bool,
    pub checked_in: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservation {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub slot_id: i32,
    pub confirmed: bool,
}

impl NewReservation {
    pub fn for_slot(slot: &Slot, requester: Requester) -> Self {
        Self {
            full_name: requester.full_name,
            phone: requester.phone,
            email: requester.email,
            appointment_date: slot.date,
            appointment_time: slot.time.clone(),
            slot_id: slot.id,
            confirmed: true,
        }
    }
}

/// The person asking for an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub full_name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckIn {
    CheckedIn,
    AlreadyCheckedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReservationStats {
    pub today_booked: i64,
    pub total_upcoming: i64,
}
