//! AppointmentGenerator - Deterministic slot offers.
//!
//! Slots start on the first business day after the reference instant, in
//! clinic-local time, one per business day. Providers rotate round-robin and
//! daily start times cycle through [`START_TIMES`], so a given instant always
//! produces the same offer.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};

/// Length of every appointment.
pub const SLOT_MINUTES: i64 = 30;

/// Clinic-local start times as (hour, minute).
const START_TIMES: [(u32, u32); 4] = [(9, 0), (10, 30), (14, 0), (15, 30)];

/// A clinician who can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub name: &'static str,
    pub specialty: &'static str,
    pub location: &'static str,
}

/// The fixed provider roster, in booking order.
pub const PROVIDERS: [Provider; 4] = [
    Provider {
        name: "Dr. Sarah Johnson",
        specialty: "Family Medicine",
        location: "Main Office",
    },
    Provider {
        name: "Dr. Michael Chen",
        specialty: "Internal Medicine",
        location: "Downtown Clinic",
    },
    Provider {
        name: "Dr. Emily Rodriguez",
        specialty: "Pediatrics",
        location: "Children's Center",
    },
    Provider {
        name: "Dr. James Williams",
        specialty: "Family Medicine",
        location: "Main Office",
    },
];

/// One bookable appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub provider: String,
    pub specialty: String,
    pub location: String,
    pub start_time: DateTime<FixedOffset>,
}

impl AppointmentSlot {
    /// End of the appointment.
    pub fn end_time(&self) -> DateTime<FixedOffset> {
        self.start_time + Duration::minutes(SLOT_MINUTES)
    }

    /// "Tuesday, October 20 at 9:00 AM"
    pub fn spoken_time(&self) -> String {
        self.start_time.format("%A, %B %-d at %-I:%M %p").to_string()
    }

    /// Provider surname for matching spoken choices.
    pub fn provider_surname(&self) -> &str {
        self.provider.rsplit(' ').next().unwrap_or(&self.provider)
    }
}

/// Produces appointment offers in clinic-local time.
#[derive(Debug, Clone, Copy)]
pub struct AppointmentGenerator {
    offset: FixedOffset,
}

impl AppointmentGenerator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a generator from a UTC offset in minutes (east positive).
    pub fn from_utc_offset_minutes(minutes: i32) -> Result<Self, ValidationError> {
        FixedOffset::east_opt(minutes * 60)
            .map(Self::new)
            .ok_or_else(|| {
                ValidationError::out_of_range("clinic_utc_offset_minutes", -1439, 1439, minutes as i64)
            })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Generates `count` slots after `now`.
    pub fn generate(&self, now: Timestamp, count: usize) -> Vec<AppointmentSlot> {
        let today = now.local_at(self.offset).date();

        business_days_after(today)
            .take(count)
            .enumerate()
            .filter_map(|(index, day)| {
                let provider = PROVIDERS[index % PROVIDERS.len()];
                let (hour, minute) = START_TIMES[index % START_TIMES.len()];
                let start_time = day
                    .and_hms_opt(hour, minute, 0)?
                    .and_local_timezone(self.offset)
                    .single()?;

                Some(AppointmentSlot {
                    provider: provider.name.to_string(),
                    specialty: provider.specialty.to_string(),
                    location: provider.location.to_string(),
                    start_time,
                })
            })
            .collect()
    }
}

impl Default for AppointmentGenerator {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

fn business_days_after(day: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    day.iter_days()
        .skip(1)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}
