use crate::error::BookingError;
use crate::types::NewSlot;
use chrono::{Duration, NaiveDate};

/// Shape of one day's slot inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConfig {
    pub slot_duration_minutes: u32,
    pub working_hours_start: u32,
    pub working_hours_end: u32,
    pub capacity: u32,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            slot_duration_minutes: 30,
            working_hours_start: 9,
            working_hours_end: 17,
            capacity: 1,
        }
    }
}

impl SlotConfig {
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.slot_duration_minutes == 0 {
            return Err(BookingError::InvalidConfiguration(
                "slot duration must be at least one minute".into(),
            ));
        }
        if self.working_hours_end > 24 {
            return Err(BookingError::InvalidConfiguration(format!(
                "working hours end at {} but a day has 24 hours",
                self.working_hours_end
            )));
        }
        if self.working_hours_start >= self.working_hours_end {
            return Err(BookingError::InvalidConfiguration(format!(
                "working hours start ({}) must be before their end ({})",
                self.working_hours_start, self.working_hours_end
            )));
        }
        if self.capacity == 0 || i32::try_from(self.capacity).is_err() {
            return Err(BookingError::InvalidConfiguration(format!(
                "slot capacity {} is out of range",
                self.capacity
            )));
        }
        Ok(())
    }

    /// Number of slots a day holds, the last one starting before the end of
    /// working hours.
    pub fn slots_per_day(&self) -> usize {
        if self.slot_duration_minutes == 0 || self.working_hours_end <= self.working_hours_start {
            return 0;
        }
        let minutes = (self.working_hours_end - self.working_hours_start) * 60;
        minutes.div_ceil(self.slot_duration_minutes) as usize
    }
}

/// `HH:MM` start labels of a day's slots in chronological order.
pub fn slot_times(date: NaiveDate, config: &SlotConfig) -> Result<Vec<String>, BookingError> {
    config.validate()?;

    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        BookingError::InvalidConfiguration(format!("{date} has no midnight"))
    })?;
    let start = midnight + Duration::hours(config.working_hours_start.into());
    let end = midnight + Duration::hours(config.working_hours_end.into());
    let step = Duration::minutes(config.slot_duration_minutes.into());

    let mut times = Vec::with_capacity(config.slots_per_day());
    let mut current = start;
    while current < end {
        times.push(current.format("%H:%M").to_string());
        current += step;
    }
    Ok(times)
}

/// Fresh, unbooked inventory for `date`.
pub fn new_slots_for(date: NaiveDate, config: &SlotConfig) -> Result<Vec<NewSlot>, BookingError> {
    let times = slot_times(date, config)?;
    // validate() guarantees the capacity fits
    let capacity = config.capacity as i32;

    Ok(times
        .into_iter()
        .map(|time| NewSlot {
            date,
            time,
            capacity,
            booked: 0,
        })
        .collect())
}
