//! Error types shared by every slot backend.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    /// Every slot of the date is at capacity.
    #[error("No slots available on {date}")]
    NoCapacity { date: NaiveDate },

    /// Another generator wrote part of the day's inventory while this one ran.
    #[error("Slot generation for {date} conflicted: inserted {inserted} of {expected} slots")]
    GenerationConflict {
        date: NaiveDate,
        inserted: usize,
        expected: usize,
    },

    #[error("Reservation {0} not found")]
    NotFound(i32),

    #[error("Invalid slot configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Database connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl BookingError {
    /// Whether the failure comes from the storage layer rather than from the
    /// request itself.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Connection(_) | Self::StorageUnavailable(_)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classify_persistence_failures() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        assert!(BookingError::StorageUnavailable("lock poisoned".into()).is_persistence_failure());
        assert!(BookingError::Database(diesel::result::Error::NotFound).is_persistence_failure());
        assert!(!BookingError::NoCapacity { date }.is_persistence_failure());
        assert!(!BookingError::NotFound(7).is_persistence_failure());
        assert_eq!(
            BookingError::NoCapacity { date }.to_string(),
            "No slots available on 2025-03-01"
        );
    }
}
