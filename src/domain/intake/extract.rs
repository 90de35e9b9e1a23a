//! Field extraction from transcribed speech.
//!
//! One extractor per collecting step. Extractors are pure functions over
//! the transcript and return `None` (or an empty partial) when nothing
//! usable was heard. They never look at fields belonging to other steps.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::scheduling::AppointmentSlot;

use super::{Contact, PartialInsurance, Referral};

/// Earliest year accepted for a date of birth.
pub const MIN_BIRTH_YEAR: i32 = 1900;

static NAME_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:hi|hello|hey|yes|yeah|sure|okay|ok|um|uh)[,.!]?\s+)*(?:my\s+(?:full\s+)?name\s+is|my\s+name's|name\s+is|this\s+is|i\s+am|i'm|it's|it\s+is|call\s+me)\s+",
    )
    .expect("valid name prefix regex")
});

static NAME_CUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[,.;!?]|\s+(?:and|born|my|i|i'm|from)\s").expect("valid name cut regex")
});

const NAME_STOP_WORDS: &[&str] = &[
    "know", "don't", "dont", "not", "sure", "what", "why", "no", "sorry", "repeat", "again",
    "please", "um", "uh", "hello", "calling", "appointment", "yes", "okay", "i", "you", "me",
    "we", "it", "a", "an", "the", "this", "that", "have", "has", "need", "want", "can", "could",
    "would", "hold", "on", "to", "is", "are", "do", "hear", "question", "second", "minute",
    "wait", "help",
];

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid iso date regex"));

static US_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})\b").expect("valid numeric date regex")
});

const MONTH_PATTERN: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

static MONTH_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{}\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b",
        MONTH_PATTERN
    ))
    .expect("valid month-first regex")
});

static DAY_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{},?\s+(\d{{4}})\b",
        MONTH_PATTERN
    ))
    .expect("valid day-first regex")
});

/// Known payers as (canonical name, spoken aliases). Longer aliases first.
const PAYERS: &[(&str, &[&str])] = &[
    (
        "Blue Cross Blue Shield",
        &["blue cross blue shield", "blue cross", "blue shield", "bcbs"],
    ),
    (
        "UnitedHealthcare",
        &["unitedhealthcare", "united healthcare", "united health care", "united health"],
    ),
    ("Kaiser Permanente", &["kaiser permanente", "kaiser"]),
    ("Aetna", &["aetna"]),
    ("Cigna", &["cigna"]),
    ("Humana", &["humana"]),
    ("Medicare", &["medicare"]),
    ("Medicaid", &["medicaid"]),
    ("Anthem", &["anthem"]),
    ("Tricare", &["tricare"]),
    ("Molina", &["molina"]),
    ("Oscar", &["oscar"]),
    ("Ambetter", &["ambetter"]),
    ("Highmark", &["highmark"]),
];

static PAYER_PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:insurance\s+(?:provider\s+|company\s+|carrier\s+)?is|insured\s+(?:with|through|by)|covered\s+by|i\s+have|i'm\s+with)\s+([a-z][a-z&' ]*?)(?:\s+(?:and|my|member|id|policy|number|insurance|plan)\b|[,.;]|$)",
    )
    .expect("valid payer phrase regex")
});

const MEMBER_ID_KEYWORDS: &[&str] = &["id", "number", "#", "identification"];

static NEGATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:no|nope|not|don't|dont|do\s+not|doesn't|haven't|didn't|none|without|nah)\b")
        .expect("valid negative regex")
});

static REFERRAL_YES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:yes|yeah|yep|yup|i\s+do|i\s+have|i\s+did|sure|correct|referred|referral\s+from)\b")
        .expect("valid referral regex")
});

static PHYSICIAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:dr\.?|doctor)\s+([a-z][a-z'\-]+(?:\s+[a-z][a-z'\-]+)?)")
        .expect("valid physician regex")
});

const PHYSICIAN_STOP_WORDS: &[&str] = &["and", "from", "at", "who", "is", "in", "my", "on", "said", "referred"];

static COMPLAINT_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:um|uh|well|so|yeah|yes|okay|ok)[,.]?\s+)*(?:(?:i'm|i\s+am)\s+(?:calling|coming\s+in|here)\s+(?:for|about|because\s+of|because)|(?:it's|it\s+is)\s+(?:for|about|because\s+of)|the\s+reason\s+is|i\s+need\s+to\s+see\s+someone\s+(?:for|about))\s+",
    )
    .expect("valid complaint prefix regex")
});

const NON_ANSWERS: &[&str] = &[
    "i don't know", "i dont know", "not sure", "i'm not sure", "no idea", "nothing", "um", "uh",
    "what", "sorry", "can you repeat that",
];

static SAME_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:this|same|that)\s+(?:phone\s+)?number\b|\bcalling\s+from\b|\bthe\s+one\s+i'm\s+calling\b")
        .expect("valid same number regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[\s.\-]?)?\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4}").expect("valid phone regex")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

static SPOKEN_AT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+at\s+").expect("valid spoken at regex"));

static SPOKEN_DOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+dot\s+").expect("valid spoken dot regex"));

const ORDINALS: &[&[&str]] = &[
    &["first", "1st", "number one", "option one", "number 1", "option 1"],
    &["second", "2nd", "number two", "option two", "number 2", "option 2"],
    &["third", "3rd", "number three", "option three", "number 3", "option 3"],
    &["fourth", "4th", "number four", "option four", "number 4", "option 4"],
    &["fifth", "5th", "number five", "option five", "number 5", "option 5"],
];

static AFFIRMATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:yes|yeah|yep|yup|correct|sure|confirm|confirmed|that\s+works|sounds\s+good|perfect|absolutely|okay|ok|please\s+do|book\s+it|right)\b")
        .expect("valid affirmative regex")
});

static DECLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:no|nope|not|don't|dont|different|another|other|change|wait)\b")
        .expect("valid decline regex")
});

/// Trims, collapses whitespace and drops trailing punctuation.
pub fn normalize(transcript: &str) -> String {
    transcript
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ','))
        .to_string()
}

/// Lowercased transcript with punctuation replaced by spaces, padded for
/// whole-word `contains` checks.
fn padded_words(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn contains_phrase(padded: &str, phrase: &str) -> bool {
    padded.contains(&format!(" {} ", phrase))
}

fn title_case(word: &str) -> String {
    let has_upper = word.chars().any(char::is_uppercase);
    let has_lower = word.chars().any(char::is_lowercase);
    if has_upper && has_lower {
        return word.to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_non_answer(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NON_ANSWERS.contains(&lowered.trim())
}

/// Full name, two to five alphabetic words, title-cased.
pub fn extract_name(transcript: &str) -> Option<String> {
    let text = normalize(transcript);
    let stripped = NAME_PREFIX_RE.replace(&text, "");
    let phrase = match NAME_CUT_RE.find(&stripped) {
        Some(cut) => &stripped[..cut.start()],
        None => &stripped[..],
    };

    let words: Vec<&str> = phrase.split_whitespace().collect();
    if !(2..=5).contains(&words.len()) {
        return None;
    }
    let valid = words.iter().all(|w| {
        w.chars().any(char::is_alphabetic)
            && w.chars().all(|c| c.is_alphabetic() || matches!(c, '\'' | '-' | '.'))
            && !NAME_STOP_WORDS.contains(&w.to_lowercase().as_str())
    });
    if !valid {
        return None;
    }

    Some(words.iter().map(|w| title_case(w)).collect::<Vec<_>>().join(" "))
}

fn month_number(name: &str) -> Option<u32> {
    let lowered = name.to_lowercase();
    let month = match lowered.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn plausible_birth_date(year: i32, month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    (date.year() >= MIN_BIRTH_YEAR && date < today).then_some(date)
}

/// Date of birth in numeric (US month-first or ISO) or spoken-month form.
pub fn extract_date_of_birth(transcript: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = normalize(transcript);

    if let Some(caps) = ISO_DATE_RE.captures(&text) {
        return plausible_birth_date(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
            today,
        );
    }
    if let Some(caps) = US_DATE_RE.captures(&text) {
        return plausible_birth_date(
            caps[3].parse().ok()?,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            today,
        );
    }
    if let Some(caps) = MONTH_FIRST_RE.captures(&text) {
        return plausible_birth_date(
            caps[3].parse().ok()?,
            month_number(&caps[1])?,
            caps[2].parse().ok()?,
            today,
        );
    }
    if let Some(caps) = DAY_FIRST_RE.captures(&text) {
        return plausible_birth_date(
            caps[3].parse().ok()?,
            month_number(&caps[2])?,
            caps[1].parse().ok()?,
            today,
        );
    }
    None
}

fn extract_payer(text: &str) -> Option<String> {
    let padded = padded_words(text);
    for (canonical, aliases) in PAYERS {
        if aliases.iter().any(|alias| contains_phrase(&padded, alias)) {
            return Some((*canonical).to_string());
        }
    }

    let caps = PAYER_PHRASE_RE.captures(text)?;
    let phrase = caps.get(1)?.as_str().trim();
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() || words.len() > 5 {
        return None;
    }
    if words.iter().any(|w| NEGATIVE_RE.is_match(w)) {
        return None;
    }
    Some(words.iter().map(|w| title_case(w)).collect::<Vec<_>>().join(" "))
}

fn is_id_fragment(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && (token.chars().any(|c| c.is_ascii_digit()) || token.len() <= 3)
}

static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d{1,3}(?:st|nd|rd|th)$").expect("valid ordinal regex"));

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:19|20)\d{2}$").expect("valid year regex"));

/// Dates said at the wrong step ("14th", "1985") are not member ids.
fn looks_like_id(candidate: &str) -> bool {
    candidate.len() >= 4
        && candidate.chars().any(|c| c.is_ascii_digit())
        && !ORDINAL_RE.is_match(candidate)
        && !YEAR_RE.is_match(candidate)
}

fn extract_member_id(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | ':' | '"')))
        .filter(|t| !t.is_empty())
        .collect();

    if let Some(keyword) = tokens
        .iter()
        .position(|t| MEMBER_ID_KEYWORDS.contains(&t.to_lowercase().as_str()))
    {
        let fragments: String = tokens[keyword + 1..]
            .iter()
            .skip_while(|t| matches!(t.to_lowercase().as_str(), "is" | "number" | "its" | "it's"))
            .take_while(|t| is_id_fragment(t))
            .copied()
            .collect();
        if looks_like_id(&fragments) {
            return Some(fragments.to_uppercase());
        }
    }

    tokens
        .iter()
        .find(|t| t.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') && looks_like_id(t))
        .map(|t| t.to_uppercase())
}

/// Insurance payer and member id. Either part may be absent.
pub fn extract_insurance(transcript: &str) -> PartialInsurance {
    let text = normalize(transcript);
    PartialInsurance {
        payer: extract_payer(&text),
        member_id: extract_member_id(&text),
    }
}

fn extract_physician(text: &str) -> Option<String> {
    let caps = PHYSICIAN_RE.captures(text)?;
    let words: Vec<String> = caps
        .get(1)?
        .as_str()
        .split_whitespace()
        .take_while(|w| !PHYSICIAN_STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .map(title_case)
        .collect();
    if words.is_empty() {
        return None;
    }
    Some(format!("Dr. {}", words.join(" ")))
}

/// Yes/no referral answer with the referring physician when named.
pub fn extract_referral(transcript: &str) -> Option<Referral> {
    let text = normalize(transcript);
    let negative = NEGATIVE_RE.is_match(&text);
    let affirmative = REFERRAL_YES_RE.is_match(&text);
    let physician = extract_physician(&text);

    match (affirmative, negative, physician) {
        (_, false, Some(physician)) => Some(Referral {
            has_referral: true,
            physician: Some(physician),
        }),
        (true, false, None) => Some(Referral {
            has_referral: true,
            physician: None,
        }),
        (false, true, _) => Some(Referral {
            has_referral: false,
            physician: None,
        }),
        _ => None,
    }
}

/// Reason for the visit, with leading filler removed.
pub fn extract_complaint(transcript: &str) -> Option<String> {
    let text = normalize(transcript);
    if is_non_answer(&text) {
        return None;
    }
    let stripped = COMPLAINT_PREFIX_RE.replace(&text, "").trim().to_string();
    if stripped.chars().filter(|c| c.is_alphabetic()).count() < 2 || is_non_answer(&stripped) {
        return None;
    }
    Some(stripped)
}

/// Any non-empty address text; decomposition happens in validation.
pub fn extract_address_text(transcript: &str) -> Option<String> {
    let text = normalize(transcript);
    if text.chars().filter(|c| c.is_alphanumeric()).count() < 3 || is_non_answer(&text) {
        return None;
    }
    Some(text)
}

/// Ten-digit North American number, dropping a leading country code.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => Some(digits[1..].to_string()),
        _ => None,
    }
}

fn extract_email(text: &str) -> Option<String> {
    if let Some(found) = EMAIL_RE.find(text) {
        return Some(found.as_str().trim_end_matches('.').to_lowercase());
    }
    let spoken = SPOKEN_AT_RE.replace_all(text, "@");
    let spoken = SPOKEN_DOT_RE.replace_all(&spoken, ".");
    EMAIL_RE
        .find(&spoken)
        .map(|found| found.as_str().trim_end_matches('.').to_lowercase())
}

/// Phone number (required) and email (optional).
///
/// "This number" resolves to `caller_number` when the platform supplied one.
pub fn extract_contact(transcript: &str, caller_number: Option<&str>) -> Option<Contact> {
    let text = normalize(transcript);
    let email = extract_email(&text);

    let phone = PHONE_RE
        .find(&text)
        .and_then(|found| normalize_phone(found.as_str()))
        .or_else(|| {
            if SAME_NUMBER_RE.is_match(&text) {
                caller_number.and_then(normalize_phone)
            } else {
                None
            }
        })?;

    Some(Contact { phone, email })
}

/// Index of the single slot the caller picked, by ordinal, provider or weekday.
///
/// Returns `None` when nothing matches or more than one slot does.
pub fn extract_slot_choice(transcript: &str, slots: &[AppointmentSlot]) -> Option<usize> {
    let padded = padded_words(&normalize(transcript));
    let mut matches = BTreeSet::new();

    for (index, phrases) in ORDINALS.iter().enumerate().take(slots.len()) {
        if phrases.iter().any(|p| contains_phrase(&padded, p)) {
            matches.insert(index);
        }
    }
    if !slots.is_empty() && (contains_phrase(&padded, "last") || contains_phrase(&padded, "last one")) {
        matches.insert(slots.len() - 1);
    }

    for (index, slot) in slots.iter().enumerate() {
        let surname = slot.provider_surname().to_lowercase();
        let weekday = slot.start_time.format("%A").to_string().to_lowercase();
        if contains_phrase(&padded, &surname) || contains_phrase(&padded, &weekday) {
            matches.insert(index);
        }
    }

    if matches.len() == 1 {
        matches.into_iter().next()
    } else {
        None
    }
}

/// Yes or no. `None` when the reply is neither, or both.
pub fn extract_confirmation(transcript: &str) -> Option<bool> {
    let text = normalize(transcript);
    match (AFFIRMATIVE_RE.is_match(&text), DECLINE_RE.is_match(&text)) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::scheduling::AppointmentGenerator;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    mod name {
        use super::*;

        #[test]
        fn strips_introduction() {
            assert_eq!(extract_name("My name is Jane Doe").as_deref(), Some("Jane Doe"));
        }

        #[test]
        fn stops_at_trailing_clause() {
            assert_eq!(
                extract_name("Hi, this is john smith and I need an appointment").as_deref(),
                Some("John Smith")
            );
        }

        #[test]
        fn keeps_mixed_case_words() {
            assert_eq!(
                extract_name("it's Mary O'Brien-McKay.").as_deref(),
                Some("Mary O'Brien-McKay")
            );
        }

        #[test]
        fn rejects_single_word() {
            assert_eq!(extract_name("Jane"), None);
        }

        #[test]
        fn rejects_non_answers() {
            assert_eq!(extract_name("I don't know"), None);
            assert_eq!(extract_name("sorry what"), None);
        }

        #[test]
        fn rejects_digits() {
            assert_eq!(extract_name("Jane 42"), None);
        }

        #[test]
        fn rejects_ordinary_speech() {
            assert_eq!(extract_name("I have a question"), None);
            assert_eq!(extract_name("can you hear me"), None);
            assert_eq!(extract_name("hold on a second"), None);
            assert_eq!(extract_name("I need to make an appointment"), None);
        }
    }

    mod date_of_birth {
        use super::*;

        fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
            NaiveDate::from_ymd_opt(y, m, d)
        }

        #[test]
        fn parses_us_numeric() {
            assert_eq!(extract_date_of_birth("03/14/1985", today()), date(1985, 3, 14));
            assert_eq!(extract_date_of_birth("it's 3-14-1985", today()), date(1985, 3, 14));
        }

        #[test]
        fn parses_iso() {
            assert_eq!(extract_date_of_birth("1985-03-14", today()), date(1985, 3, 14));
        }

        #[test]
        fn parses_spoken_month() {
            assert_eq!(
                extract_date_of_birth("I was born March 14th, 1985", today()),
                date(1985, 3, 14)
            );
            assert_eq!(
                extract_date_of_birth("the 2nd of january 1990", today()),
                date(1990, 1, 2)
            );
        }

        #[test]
        fn rejects_impossible_dates() {
            assert_eq!(extract_date_of_birth("02/30/1990", today()), None);
        }

        #[test]
        fn rejects_future_and_ancient_dates() {
            assert_eq!(extract_date_of_birth("12/01/2030", today()), None);
            assert_eq!(extract_date_of_birth("01/01/1850", today()), None);
        }

        #[test]
        fn rejects_missing_year() {
            assert_eq!(extract_date_of_birth("March 14th", today()), None);
        }
    }

    mod insurance {
        use super::*;

        #[test]
        fn known_payer_and_keyword_id() {
            let heard = extract_insurance("I have Blue Cross and my member ID is XYZ 123456");
            assert_eq!(heard.payer.as_deref(), Some("Blue Cross Blue Shield"));
            assert_eq!(heard.member_id.as_deref(), Some("XYZ123456"));
        }

        #[test]
        fn bare_id_token_is_found() {
            let heard = extract_insurance("Aetna, W987654321");
            assert_eq!(heard.payer.as_deref(), Some("Aetna"));
            assert_eq!(heard.member_id.as_deref(), Some("W987654321"));
        }

        #[test]
        fn unknown_payer_from_phrase() {
            let heard = extract_insurance("my insurance is acme health plan");
            assert_eq!(heard.payer.as_deref(), Some("Acme Health"));
            assert_eq!(heard.member_id, None);
        }

        #[test]
        fn id_only_turn() {
            let heard = extract_insurance("the number is 55512345");
            assert_eq!(heard.payer, None);
            assert_eq!(heard.member_id.as_deref(), Some("55512345"));
        }

        #[test]
        fn nothing_heard() {
            assert!(extract_insurance("I'm not sure").is_empty());
        }

        #[test]
        fn spoken_date_is_not_an_id() {
            assert!(extract_insurance("March 14th, 1985").is_empty());
            assert_eq!(extract_insurance("the 2nd of june 2001").member_id, None);
        }
    }

    mod referral {
        use super::*;

        #[test]
        fn yes_with_physician() {
            let referral = extract_referral("Yes, from Dr. Patel").unwrap();
            assert!(referral.has_referral);
            assert_eq!(referral.physician.as_deref(), Some("Dr. Patel"));
        }

        #[test]
        fn physician_alone_implies_referral() {
            let referral = extract_referral("doctor alan grant referred me").unwrap();
            assert_eq!(referral.physician.as_deref(), Some("Dr. Alan Grant"));
        }

        #[test]
        fn plain_no() {
            let referral = extract_referral("No, I don't").unwrap();
            assert!(!referral.has_referral);
            assert_eq!(referral.physician, None);
        }

        #[test]
        fn unclear_answer() {
            assert_eq!(extract_referral("what do you mean"), None);
        }
    }

    mod complaint {
        use super::*;

        #[test]
        fn strips_lead_in() {
            assert_eq!(
                extract_complaint("I'm calling about persistent headaches.").as_deref(),
                Some("persistent headaches")
            );
        }

        #[test]
        fn keeps_plain_description() {
            assert_eq!(
                extract_complaint("knee pain after running").as_deref(),
                Some("knee pain after running")
            );
        }

        #[test]
        fn rejects_non_answer() {
            assert_eq!(extract_complaint("I don't know"), None);
            assert_eq!(extract_complaint(""), None);
        }
    }

    mod contact {
        use super::*;

        #[test]
        fn phone_and_written_email() {
            let contact =
                extract_contact("555-123-4567 and jane.doe@example.com", None).unwrap();
            assert_eq!(contact.phone, "5551234567");
            assert_eq!(contact.email.as_deref(), Some("jane.doe@example.com"));
        }

        #[test]
        fn spoken_email() {
            let contact = extract_contact("(555) 123 4567, email jane at example dot com", None)
                .unwrap();
            assert_eq!(contact.email.as_deref(), Some("jane@example.com"));
        }

        #[test]
        fn this_number_uses_caller_id() {
            let contact = extract_contact("you can use this number", Some("+15559876543")).unwrap();
            assert_eq!(contact.phone, "5559876543");
            assert_eq!(contact.email, None);
        }

        #[test]
        fn this_number_without_caller_id_fails() {
            assert_eq!(extract_contact("this number", None), None);
        }

        #[test]
        fn country_code_is_dropped() {
            assert_eq!(normalize_phone("+1 (555) 123-4567").as_deref(), Some("5551234567"));
            assert_eq!(normalize_phone("12345"), None);
        }
    }

    mod slots {
        use super::*;
        use chrono::{TimeZone, Utc};

        fn offered() -> Vec<AppointmentSlot> {
            let now = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap());
            AppointmentGenerator::default().generate(now, 3)
        }

        #[test]
        fn by_ordinal() {
            assert_eq!(extract_slot_choice("the second one", &offered()), Some(1));
            assert_eq!(extract_slot_choice("I'll take the last one", &offered()), Some(2));
        }

        #[test]
        fn by_provider_or_weekday() {
            assert_eq!(extract_slot_choice("Dr. Chen please", &offered()), Some(1));
            assert_eq!(extract_slot_choice("thursday works", &offered()), Some(2));
        }

        #[test]
        fn consistent_mentions_agree() {
            assert_eq!(extract_slot_choice("the first one with Johnson", &offered()), Some(0));
        }

        #[test]
        fn ambiguity_is_no_choice() {
            assert_eq!(extract_slot_choice("first or second", &offered()), None);
            assert_eq!(extract_slot_choice("Chen on Thursday", &offered()), None);
        }

        #[test]
        fn ordinal_past_offer_is_ignored() {
            assert_eq!(extract_slot_choice("the fifth", &offered()), None);
        }
    }

    mod confirmation {
        use super::*;

        #[test]
        fn yes_and_no() {
            assert_eq!(extract_confirmation("Yes, that works"), Some(true));
            assert_eq!(extract_confirmation("no"), Some(false));
        }

        #[test]
        fn mixed_is_unclear() {
            assert_eq!(extract_confirmation("yes no"), None);
            assert_eq!(extract_confirmation("hmm"), None);
        }
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  hello   there. "), "hello there");
    }
}
