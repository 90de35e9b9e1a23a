//! PatientRecord - Everything collected during one call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::scheduling::AppointmentSlot;
use crate::domain::validation::{AddressParts, PostalAddress};

/// A field value, or the explicit marker that the caller could not give one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Collected<T> {
    Provided(T),
    Unknown,
}

impl<T> Collected<T> {
    pub fn provided(&self) -> Option<&T> {
        match self {
            Collected::Provided(value) => Some(value),
            Collected::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Collected::Unknown)
    }
}

/// How far a single field got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Missing,
    Provided,
    Unknown,
}

impl FieldState {
    fn of<T>(field: &Option<Collected<T>>) -> Self {
        match field {
            None => FieldState::Missing,
            Some(Collected::Provided(_)) => FieldState::Provided,
            Some(Collected::Unknown) => FieldState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldState::Missing => "missing",
            FieldState::Provided => "provided",
            FieldState::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurance {
    pub payer: String,
    pub member_id: String,
}

/// Insurance parts gathered so far, possibly across turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialInsurance {
    pub payer: Option<String>,
    pub member_id: Option<String>,
}

impl PartialInsurance {
    /// Folds in newly heard parts. Returns true if anything new was learned.
    pub fn merge(&mut self, heard: PartialInsurance) -> bool {
        let mut learned = false;
        if self.payer.is_none() && heard.payer.is_some() {
            self.payer = heard.payer;
            learned = true;
        }
        if self.member_id.is_none() && heard.member_id.is_some() {
            self.member_id = heard.member_id;
            learned = true;
        }
        learned
    }

    pub fn complete(&self) -> Option<Insurance> {
        match (&self.payer, &self.member_id) {
            (Some(payer), Some(member_id)) => Some(Insurance {
                payer: payer.clone(),
                member_id: member_id.clone(),
            }),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payer.is_none() && self.member_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub has_referral: bool,
    pub physician: Option<String>,
}

/// A mailing address. Components stay optional so an unvalidated fallback
/// can keep whatever was recognised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub raw: String,
    pub validated: bool,
}

impl Address {
    pub fn verified(postal: PostalAddress, raw: impl Into<String>) -> Self {
        Self {
            street: Some(postal.street),
            city: Some(postal.city),
            state: Some(postal.state),
            zip: Some(postal.zip),
            raw: raw.into(),
            validated: true,
        }
    }

    pub fn unverified(parts: AddressParts, raw: impl Into<String>) -> Self {
        Self {
            street: parts.street,
            city: parts.city,
            state: parts.state,
            zip: parts.zip,
            raw: raw.into(),
            validated: false,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.street, &self.city, &self.state, &self.zip) {
            (Some(street), Some(city), Some(state), Some(zip)) => {
                write!(f, "{}, {}, {} {}", street, city, state, zip)
            }
            _ => f.write_str(&self.raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: Option<String>,
}

/// The structured result of an intake interview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: Option<Collected<String>>,
    pub date_of_birth: Option<Collected<NaiveDate>>,
    pub insurance: Option<Collected<Insurance>>,
    pub referral: Option<Collected<Referral>>,
    pub chief_complaint: Option<Collected<String>>,
    pub address: Option<Collected<Address>>,
    pub contact: Option<Collected<Contact>>,
    pub selected_appointment: Option<AppointmentSlot>,
}

impl PatientRecord {
    /// State of every field, in interview order.
    pub fn completion(&self) -> [(&'static str, FieldState); 8] {
        let slot = if self.selected_appointment.is_some() {
            FieldState::Provided
        } else {
            FieldState::Missing
        };
        [
            ("name", FieldState::of(&self.name)),
            ("date_of_birth", FieldState::of(&self.date_of_birth)),
            ("insurance", FieldState::of(&self.insurance)),
            ("referral", FieldState::of(&self.referral)),
            ("chief_complaint", FieldState::of(&self.chief_complaint)),
            ("address", FieldState::of(&self.address)),
            ("contact", FieldState::of(&self.contact)),
            ("appointment", slot),
        ]
    }

    /// "name=provided date_of_birth=unknown ..." for structured logs.
    pub fn completion_summary(&self) -> String {
        self.completion()
            .iter()
            .map(|(field, state)| format!("{}={}", field, state.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True when every field is provided or explicitly unknown and a slot is chosen.
    pub fn is_complete(&self) -> bool {
        self.completion()
            .iter()
            .all(|(_, state)| *state != FieldState::Missing)
    }

    /// Caller's name, if one was given.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_ref()
            .and_then(Collected::provided)
            .map(String::as_str)
    }
}
