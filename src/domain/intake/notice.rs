//! IntakeNotice - The completed-intake message sent to the scheduling team.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

use crate::domain::foundation::{CallId, DispatchId, Timestamp};

use super::{Collected, IntakeSession, PatientRecord};

const NOT_PROVIDED: &str = "Not provided";
const UNKNOWN: &str = "Unknown (caller could not provide)";

/// Snapshot of a completed session for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeNotice {
    pub dispatch_id: DispatchId,
    pub call_id: CallId,
    pub caller_number: Option<String>,
    pub record: PatientRecord,
    pub completed_at: Timestamp,
}

impl IntakeNotice {
    pub fn from_session(session: &IntakeSession) -> Self {
        Self {
            dispatch_id: DispatchId::new(),
            call_id: session.call_id.clone(),
            caller_number: session.caller_number.clone(),
            record: session.record.clone(),
            completed_at: session.updated_at,
        }
    }

    pub fn subject(&self) -> String {
        format!(
            "New Patient Intake - {}",
            self.record.display_name().unwrap_or("Unknown")
        )
    }

    /// Plain-text body listing every collected field.
    pub fn render_text(&self) -> String {
        let r = &self.record;
        let mut out = String::new();

        let _ = writeln!(out, "New Patient Intake Information");
        let _ = writeln!(out, "==============================");
        let _ = writeln!(out);

        let _ = writeln!(out, "Patient Details:");
        let _ = writeln!(out, "- Name: {}", field(&r.name, |n| n.clone()));
        let _ = writeln!(out, "- Date of Birth: {}", field(&r.date_of_birth, format_date));
        let _ = writeln!(out, "- Phone: {}", field(&r.contact, |c| format_phone(&c.phone)));
        let _ = writeln!(
            out,
            "- Email: {}",
            field(&r.contact, |c| c.email.clone().unwrap_or_else(|| NOT_PROVIDED.to_string()))
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Insurance Information:");
        let _ = writeln!(out, "- Payer: {}", field(&r.insurance, |i| i.payer.clone()));
        let _ = writeln!(out, "- Member ID: {}", field(&r.insurance, |i| i.member_id.clone()));
        let _ = writeln!(out);

        let _ = writeln!(out, "Referral Information:");
        let _ = writeln!(
            out,
            "- Has Referral: {}",
            field(&r.referral, |rf| if rf.has_referral { "Yes" } else { "No" }.to_string())
        );
        let _ = writeln!(
            out,
            "- Referring Physician: {}",
            field(&r.referral, |rf| rf
                .physician
                .clone()
                .unwrap_or_else(|| NOT_PROVIDED.to_string()))
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Medical Information:");
        let _ = writeln!(out, "- Chief Complaint: {}", field(&r.chief_complaint, |c| c.clone()));
        let _ = writeln!(out);

        let _ = writeln!(out, "Address Information:");
        let _ = writeln!(out, "- Address: {}", field(&r.address, |a| a.to_string()));
        let _ = writeln!(
            out,
            "- Address Validated: {}",
            field(&r.address, |a| if a.validated { "Yes" } else { "No" }.to_string())
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Requested Appointment:");
        match &r.selected_appointment {
            Some(slot) => {
                let _ = writeln!(out, "- Provider: {} ({})", slot.provider, slot.specialty);
                let _ = writeln!(out, "- Location: {}", slot.location);
                let _ = writeln!(out, "- Time: {}", slot.start_time.format("%Y-%m-%d %H:%M %:z"));
            }
            None => {
                let _ = writeln!(out, "- {}", NOT_PROVIDED);
            }
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Call: {}", self.call_id);
        if let Some(number) = &self.caller_number {
            let _ = writeln!(out, "Caller ID: {}", number);
        }
        let _ = writeln!(
            out,
            "Intake completed at: {}",
            self.completed_at.as_datetime().format("%Y-%m-%d %H:%M:%S UTC")
        );
        out
    }
}

fn field<T>(value: &Option<Collected<T>>, render: impl Fn(&T) -> String) -> String {
    match value {
        Some(Collected::Provided(v)) => render(v),
        Some(Collected::Unknown) => UNKNOWN.to_string(),
        None => NOT_PROVIDED.to_string(),
    }
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

fn format_phone(digits: &str) -> String {
    if digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()) {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        digits.to_string()
    }
}
