//! Spoken prompt templates.
//!
//! Static text lives in constants selected by step or reason; the few
//! prompts that mention slots or names are assembled by helpers here.

use std::collections::BTreeSet;

use crate::domain::scheduling::AppointmentSlot;
use crate::domain::validation::AddressComponent;

use super::{AbandonReason, InsurancePart, IntakeStep, RepromptReason};

/// Returns the question asked at a step.
///
/// `OfferAppointments` and `ConfirmAppointment` are only the closing question;
/// the slot details come from [`slot_listing`] and [`confirm_question`].
pub fn prompt_for_step(step: IntakeStep) -> &'static str {
    match step {
        IntakeStep::Greeting => GREETING,
        IntakeStep::CollectName => ASK_NAME,
        IntakeStep::CollectDOB => ASK_DOB,
        IntakeStep::CollectInsurance => ASK_INSURANCE,
        IntakeStep::CollectReferral => ASK_REFERRAL,
        IntakeStep::CollectComplaint => ASK_COMPLAINT,
        IntakeStep::CollectAddress => ASK_ADDRESS,
        IntakeStep::ValidateAddress => ASK_ADDRESS_AGAIN,
        IntakeStep::CollectContact => ASK_CONTACT,
        IntakeStep::OfferAppointments => ASK_SLOT,
        IntakeStep::ConfirmAppointment => ASK_CONFIRM,
        IntakeStep::Complete => GOODBYE,
        IntakeStep::Abandoned => GOODBYE,
    }
}

/// Short acknowledgement after a step's field was collected.
pub fn acknowledgement_for_step(step: IntakeStep) -> &'static str {
    match step {
        IntakeStep::CollectDOB | IntakeStep::CollectReferral => "Got it.",
        IntakeStep::CollectInsurance => "Thanks, I've noted your insurance.",
        IntakeStep::CollectComplaint => "Thank you for sharing that.",
        IntakeStep::CollectAddress | IntakeStep::ValidateAddress => {
            "Thank you, I've verified your address."
        }
        IntakeStep::CollectContact => "Thanks. Let me find some appointment times for you.",
        _ => "Thank you.",
    }
}

/// Lead-in when re-asking.
pub fn reprompt_lead(reason: &RepromptReason) -> &'static str {
    match reason {
        RepromptReason::NotUnderstood => "I'm sorry, I didn't catch that.",
        RepromptReason::LowConfidence => "I'm sorry, I had trouble hearing you.",
        RepromptReason::InsurancePartial(_) => "Thank you.",
        RepromptReason::AddressIncomplete(_) => "I wasn't able to verify that address.",
        RepromptReason::SlotNotRecognised => {
            "I'm sorry, I didn't catch which appointment you'd like."
        }
        RepromptReason::SlotChanged => "Okay, let's switch to that one.",
        RepromptReason::SlotDeclined => "No problem. Here are the options again.",
        RepromptReason::ConfirmationUnclear => "Sorry, please answer yes or no.",
    }
}

/// The narrower question asked when only part of the insurance is missing.
pub fn insurance_part_question(part: InsurancePart) -> &'static str {
    match part {
        InsurancePart::Payer => "What is the name of your insurance company?",
        InsurancePart::MemberId => "What is your member ID number?",
    }
}

/// Joins items as spoken English: "a", "a and b", "a, b, and c".
pub fn spoken_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head = init.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", ");
            format!("{}, and {}", head, last.as_ref())
        }
    }
}

/// Asks for exactly the address components that are missing.
pub fn missing_address_question(missing: &BTreeSet<AddressComponent>) -> String {
    if missing.is_empty() {
        return ASK_ADDRESS_AGAIN.to_string();
    }
    let names: Vec<&str> = missing.iter().map(AddressComponent::spoken_name).collect();
    format!("Please tell me the {}.", spoken_list(&names))
}

/// Reads the offered slots aloud.
pub fn slot_listing(slots: &[AppointmentSlot]) -> String {
    if slots.is_empty() {
        return NO_SLOTS.to_string();
    }
    let options: Vec<String> = slots
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            format!(
                "Option {}: {}, {}, at the {}, on {}.",
                ORDINAL_WORDS.get(idx).copied().unwrap_or("next"),
                slot.provider,
                slot.specialty,
                slot.location,
                slot.spoken_time()
            )
        })
        .collect();
    format!("I have the following appointments available. {}", options.join(" "))
}

/// Reads back the selected slot and asks for a yes or no.
pub fn confirm_question(slot: Option<&AppointmentSlot>) -> String {
    match slot {
        Some(slot) => format!(
            "You've chosen {} on {} at the {}. {}",
            slot.provider,
            slot.spoken_time(),
            slot.location,
            ASK_CONFIRM
        ),
        None => ASK_SLOT.to_string(),
    }
}

/// Closing line for a booked appointment.
pub fn completion_message(slot: Option<&AppointmentSlot>) -> String {
    match slot {
        Some(slot) => format!(
            "Your appointment with {} on {} at the {} is requested. {}",
            slot.provider,
            slot.spoken_time(),
            slot.location,
            COMPLETION_TAIL
        ),
        None => COMPLETION_TAIL.to_string(),
    }
}

pub fn abandon_message(reason: AbandonReason) -> &'static str {
    match reason {
        AbandonReason::RetriesExhausted => RETRIES_EXHAUSTED,
        AbandonReason::InactivityTimeout | AbandonReason::CallerHungUp => GOODBYE,
    }
}

pub const ALREADY_FINISHED: &str =
    "This call has already been completed. Thank you for calling. Goodbye.";

pub const FALLBACK_LEAD: &str = "No problem, we can move on.";

pub const TECHNICAL_DIFFICULTY: &str =
    "I'm sorry, we're having a technical problem. Please say that again.";

const ORDINAL_WORDS: [&str; 5] = ["one", "two", "three", "four", "five"];

const GREETING: &str = "Hello! Thank you for calling. I'm here to help you schedule an appointment. May I have your full name, please?";

const ASK_NAME: &str = "May I have your full name, please?";

const ASK_DOB: &str = "What is your date of birth?";

const ASK_INSURANCE: &str =
    "What is the name of your insurance company, and what is your member ID?";

const ASK_REFERRAL: &str =
    "Do you have a referral from another physician? If so, which doctor referred you?";

const ASK_COMPLAINT: &str = "What is the main reason for your visit?";

const ASK_ADDRESS: &str =
    "What is your mailing address, including the street, city, state, and ZIP code?";

const ASK_ADDRESS_AGAIN: &str =
    "Please say your full mailing address again, including the street number, city, state, and ZIP code.";

const ASK_CONTACT: &str = "What is the best phone number to reach you? You can also give me an email address.";

const ASK_SLOT: &str = "Which appointment would you like? You can say the option number or the doctor's name.";

const ASK_CONFIRM: &str = "Shall I book that appointment for you?";

const NO_SLOTS: &str = "I'm sorry, I don't have any appointments to offer right now.";

const COMPLETION_TAIL: &str = "Our scheduling team will follow up to confirm. Thank you for calling, goodbye.";

const RETRIES_EXHAUSTED: &str = "I'm sorry, I wasn't able to finish your booking. Please call our office directly and a staff member will help you. Goodbye.";

const GOODBYE: &str = "Thank you for calling. Goodbye.";
