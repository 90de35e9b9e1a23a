//! Mailing address validation.
//!
//! The heuristic validator decomposes a spoken address into four required
//! components using independent presence checks. It is a placeholder for a
//! real verification service, which plugs in through [`AddressValidator`].

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid zip regex"));

static STREET_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,6}[A-Za-z]?$").expect("valid street number regex"));

/// USPS two-letter codes paired with the full state name.
const STATES: &[(&str, &str)] = &[
    ("AL", "alabama"),
    ("AK", "alaska"),
    ("AZ", "arizona"),
    ("AR", "arkansas"),
    ("CA", "california"),
    ("CO", "colorado"),
    ("CT", "connecticut"),
    ("DE", "delaware"),
    ("DC", "district of columbia"),
    ("FL", "florida"),
    ("GA", "georgia"),
    ("HI", "hawaii"),
    ("ID", "idaho"),
    ("IL", "illinois"),
    ("IN", "indiana"),
    ("IA", "iowa"),
    ("KS", "kansas"),
    ("KY", "kentucky"),
    ("LA", "louisiana"),
    ("ME", "maine"),
    ("MD", "maryland"),
    ("MA", "massachusetts"),
    ("MI", "michigan"),
    ("MN", "minnesota"),
    ("MS", "mississippi"),
    ("MO", "missouri"),
    ("MT", "montana"),
    ("NE", "nebraska"),
    ("NV", "nevada"),
    ("NH", "new hampshire"),
    ("NJ", "new jersey"),
    ("NM", "new mexico"),
    ("NY", "new york"),
    ("NC", "north carolina"),
    ("ND", "north dakota"),
    ("OH", "ohio"),
    ("OK", "oklahoma"),
    ("OR", "oregon"),
    ("PA", "pennsylvania"),
    ("RI", "rhode island"),
    ("SC", "south carolina"),
    ("SD", "south dakota"),
    ("TN", "tennessee"),
    ("TX", "texas"),
    ("UT", "utah"),
    ("VT", "vermont"),
    ("VA", "virginia"),
    ("WA", "washington"),
    ("WV", "west virginia"),
    ("WI", "wisconsin"),
    ("WY", "wyoming"),
];

const STREET_SUFFIXES: &[&str] = &[
    "street", "st", "avenue", "ave", "av", "road", "rd", "boulevard", "blvd", "drive", "dr",
    "lane", "ln", "way", "court", "ct", "place", "pl", "terrace", "ter", "parkway", "pkwy",
    "highway", "hwy", "circle", "cir", "trail", "trl", "square", "sq", "loop", "alley", "row",
    "path", "crescent", "plaza", "pike",
];

const UNIT_DESIGNATORS: &[&str] = &["apt", "apartment", "suite", "ste", "unit", "#", "floor", "fl"];

/// One of the four parts every deliverable address needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressComponent {
    StreetNumber,
    City,
    State,
    Zip,
}

impl AddressComponent {
    /// How the component is named when speaking to a caller.
    pub fn spoken_name(&self) -> &'static str {
        match self {
            AddressComponent::StreetNumber => "street number",
            AddressComponent::City => "city",
            AddressComponent::State => "state",
            AddressComponent::Zip => "ZIP code",
        }
    }
}

impl fmt::Display for AddressComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spoken_name())
    }
}

/// Components recognised in an address, complete or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// A fully decomposed, normalised address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl fmt::Display for PostalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

/// Result of checking one address string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCheck {
    pub valid: bool,
    pub missing: BTreeSet<AddressComponent>,
    /// Normalised address, present only when `valid`.
    pub corrected: Option<PostalAddress>,
    /// Whatever could be recognised, for fallback storage.
    pub parts: AddressParts,
}

impl AddressCheck {
    fn from_parts(parts: AddressParts, has_street_number: bool) -> Self {
        let mut missing = BTreeSet::new();
        if !has_street_number {
            missing.insert(AddressComponent::StreetNumber);
        }
        if parts.city.is_none() {
            missing.insert(AddressComponent::City);
        }
        if parts.state.is_none() {
            missing.insert(AddressComponent::State);
        }
        if parts.zip.is_none() {
            missing.insert(AddressComponent::Zip);
        }

        let corrected = match (&parts.street, &parts.city, &parts.state, &parts.zip) {
            (Some(street), Some(city), Some(state), Some(zip)) if missing.is_empty() => {
                Some(PostalAddress {
                    street: street.clone(),
                    city: city.clone(),
                    state: state.clone(),
                    zip: zip.clone(),
                })
            }
            _ => None,
        };

        Self {
            valid: corrected.is_some(),
            missing,
            corrected,
            parts,
        }
    }
}

/// Checks a free-form address.
///
/// Implementations must be pure: the same input always yields the same check.
pub trait AddressValidator: Send + Sync {
    fn check(&self, address: &str) -> AddressCheck;
}

/// Presence-check validator for US mailing addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAddressValidator;

impl HeuristicAddressValidator {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone)]
struct Token {
    text: String,
    comma_after: bool,
}

impl Token {
    fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    fn is_word(&self) -> bool {
        self.text.chars().any(char::is_alphabetic)
            && self
                .text
                .chars()
                .all(|c| c.is_alphabetic() || c == '\'' || c == '.' || c == '-')
    }

    fn is_unit(&self) -> bool {
        UNIT_DESIGNATORS.contains(&self.lower().trim_end_matches('.'))
    }

    fn is_suffix(&self) -> bool {
        STREET_SUFFIXES.contains(&self.lower().trim_end_matches('.'))
    }
}

fn tokenize(address: &str) -> Vec<Token> {
    address
        .split_whitespace()
        .filter_map(|raw| {
            let comma_after = raw.ends_with(',') || raw.ends_with(';');
            let text = raw
                .trim_matches(|c: char| c == ',' || c == ';' || c == '"')
                .trim_end_matches('.')
                .to_string();
            if text.is_empty() {
                None
            } else {
                Some(Token { text, comma_after })
            }
        })
        .collect()
}

/// The last ZIP-shaped token. A leading five-digit token with more words
/// after it is a house number, not a ZIP.
fn find_zip(tokens: &[Token]) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .rev()
        .find(|&(idx, t)| ZIP_RE.is_match(&t.text) && !(idx == 0 && tokens.len() > 1))
        .map(|(idx, _)| idx)
}

/// Finds the state nearest the end, returning `(start, len, code)`.
fn find_state(tokens: &[Token], zip_idx: Option<usize>) -> Option<(usize, usize, &'static str)> {
    for start in (1..tokens.len()).rev() {
        if Some(start) == zip_idx {
            continue;
        }
        for len in (1..=3).rev() {
            if start + len > tokens.len() {
                continue;
            }
            let phrase = tokens[start..start + len]
                .iter()
                .map(Token::lower)
                .collect::<Vec<_>>()
                .join(" ");
            if let Some((code, _)) = STATES.iter().find(|(_, name)| *name == phrase) {
                return Some((start, len, code));
            }
        }

        let token = &tokens[start];
        if token.text.len() == 2 {
            let upper = token.text.to_uppercase();
            if let Some((code, _)) = STATES.iter().find(|(code, _)| *code == upper) {
                let is_upper = token.text == upper;
                let anchored = start + 1 == tokens.len() || Some(start + 1) == zip_idx;
                if is_upper || anchored {
                    return Some((start, 1, code));
                }
            }
        }
    }
    None
}

fn join(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// City words between `from` and `boundary`, skipping unit designators.
fn city_words(tokens: &[Token], from: usize, boundary: usize) -> Vec<Token> {
    let mut words = Vec::new();
    let mut idx = from;
    while idx < boundary {
        let token = &tokens[idx];
        if token.is_unit() {
            idx += 2;
            continue;
        }
        if token.is_word() {
            words.push(token.clone());
        }
        idx += 1;
    }
    words
}

impl AddressValidator for HeuristicAddressValidator {
    fn check(&self, address: &str) -> AddressCheck {
        let tokens = tokenize(address);
        let zip_idx = find_zip(&tokens);
        let state = find_state(&tokens, zip_idx);

        let boundary = [state.map(|(start, _, _)| start), zip_idx]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(tokens.len());

        let number_idx = tokens[..boundary]
            .iter()
            .position(|t| STREET_NUMBER_RE.is_match(&t.text));
        let street_start = number_idx.unwrap_or(0);

        // Comma segments take priority: "123 Main St, Springfield, IL".
        let mut segments: Vec<(usize, usize)> = Vec::new();
        let mut seg_start = 0;
        for (idx, token) in tokens[..boundary].iter().enumerate() {
            if token.comma_after {
                segments.push((seg_start, idx + 1));
                seg_start = idx + 1;
            }
        }
        if seg_start < boundary {
            segments.push((seg_start, boundary));
        }

        let suffix_idx = (street_start..boundary)
            .rev()
            .find(|&idx| tokens[idx].is_suffix() && idx > street_start);

        let street_segment = segments
            .iter()
            .position(|&(from, to)| from <= street_start && street_start < to)
            .filter(|&idx| idx + 1 < segments.len());

        let (street_end, city) = if let Some(seg) = street_segment {
            let city = segments[seg + 1..]
                .iter()
                .rev()
                .map(|&(from, to)| city_words(&tokens, from, to))
                .find(|words| !words.is_empty());
            (segments[seg].1, city)
        } else if let Some(suffix) = suffix_idx {
            let words = city_words(&tokens, suffix + 1, boundary);
            (suffix + 1, Some(words).filter(|w| !w.is_empty()))
        } else {
            let words = city_words(&tokens, street_start + 1, boundary);
            if words.len() >= 2 {
                let last = words.len() - 1;
                let city_idx = tokens[..boundary]
                    .iter()
                    .rposition(|t| t.text == words[last].text)
                    .unwrap_or(boundary);
                (city_idx, Some(words[last..].to_vec()))
            } else {
                (boundary, None)
            }
        };

        let street = if street_end > street_start {
            Some(join(&tokens[street_start..street_end]))
        } else {
            None
        };

        let parts = AddressParts {
            street,
            city: city.map(|words| join(&words)),
            state: state.map(|(_, _, code)| code.to_string()),
            zip: zip_idx.map(|idx| tokens[idx].text.clone()),
        };

        AddressCheck::from_parts(parts, number_idx.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn check(address: &str) -> AddressCheck {
        HeuristicAddressValidator::new().check(address)
    }

    fn missing(address: &str) -> Vec<AddressComponent> {
        check(address).missing.into_iter().collect()
    }

    mod complete_addresses {
        use super::*;

        #[test]
        fn accepts_address_without_commas() {
            let result = check("123 Main St Springfield IL 62704");

            assert!(result.valid);
            assert_eq!(
                result.corrected,
                Some(PostalAddress {
                    street: "123 Main St".to_string(),
                    city: "Springfield".to_string(),
                    state: "IL".to_string(),
                    zip: "62704".to_string(),
                })
            );
        }

        #[test]
        fn accepts_comma_separated_address_with_full_state_name() {
            let result = check("456 Oak Avenue, Austin, Texas 78701");

            assert!(result.valid);
            let corrected = result.corrected.unwrap();
            assert_eq!(corrected.city, "Austin");
            assert_eq!(corrected.state, "TX");
            assert_eq!(corrected.to_string(), "456 Oak Avenue, Austin, TX 78701");
        }

        #[test]
        fn accepts_multi_word_state_and_city() {
            let result = check("77 Broad Street New York City New York 10004");

            assert!(result.valid);
            let corrected = result.corrected.unwrap();
            assert_eq!(corrected.state, "NY");
            assert_eq!(corrected.city, "New York City");
        }

        #[test]
        fn accepts_zip_plus_four() {
            let result = check("9 Elm Rd, Dayton, OH 45402-1234");

            assert!(result.valid);
            assert_eq!(result.corrected.unwrap().zip, "45402-1234");
        }

        #[test]
        fn skips_unit_designator_when_finding_city() {
            let result = check("12 Pine Lane Apt 4B Boise ID 83702");

            assert!(result.valid);
            assert_eq!(result.corrected.unwrap().city, "Boise");
        }

        #[test]
        fn lowercase_code_is_accepted_next_to_zip() {
            assert!(check("123 main st springfield il 62704").valid);
        }
    }

    mod missing_components {
        use super::*;

        #[test]
        fn bare_street_name_misses_everything() {
            assert_eq!(
                missing("Main Street"),
                vec![
                    AddressComponent::StreetNumber,
                    AddressComponent::City,
                    AddressComponent::State,
                    AddressComponent::Zip,
                ]
            );
        }

        #[test]
        fn reports_only_zip_when_zip_absent() {
            assert_eq!(missing("456 Oak Ave Austin TX"), vec![AddressComponent::Zip]);
        }

        #[test]
        fn reports_city_and_state_when_street_runs_into_zip() {
            assert_eq!(
                missing("789 Pine Rd 10001"),
                vec![AddressComponent::City, AddressComponent::State]
            );
        }

        #[test]
        fn five_digit_house_number_is_not_the_zip() {
            let result = check("12345 Main St Springfield IL");
            assert_eq!(
                result.missing.iter().copied().collect::<Vec<_>>(),
                vec![AddressComponent::Zip]
            );
            assert_eq!(result.parts.street.as_deref(), Some("12345 Main St"));
            assert_eq!(result.parts.zip, None);
        }

        #[test]
        fn five_digit_house_number_with_zip_is_valid() {
            assert!(check("12345 Main St Springfield IL 62704").valid);
        }

        #[test]
        fn reports_street_number_when_only_number_absent() {
            assert_eq!(
                missing("Main St Springfield IL 62704"),
                vec![AddressComponent::StreetNumber]
            );
        }

        #[test]
        fn lowercase_two_letter_word_mid_sentence_is_not_a_state() {
            let result = check("12 Oak St in Springfield");
            assert!(result.missing.contains(&AddressComponent::State));
        }

        #[test]
        fn keeps_partial_parts_for_fallback() {
            let result = check("456 Oak Ave Austin TX");
            assert_eq!(result.parts.street.as_deref(), Some("456 Oak Ave"));
            assert_eq!(result.parts.city.as_deref(), Some("Austin"));
            assert_eq!(result.parts.state.as_deref(), Some("TX"));
            assert!(result.corrected.is_none());
        }

        #[test]
        fn empty_input_misses_everything() {
            assert_eq!(check("").missing.len(), 4);
        }
    }

    #[test]
    fn spoken_names_read_naturally() {
        assert_eq!(AddressComponent::Zip.spoken_name(), "ZIP code");
        assert_eq!(AddressComponent::StreetNumber.to_string(), "street number");
    }

    proptest! {
        #[test]
        fn check_is_deterministic(input in "[ -~]{0,60}") {
            prop_assert_eq!(check(&input), check(&input));
        }

        #[test]
        fn valid_exactly_when_nothing_missing(input in "[0-9A-Za-z ,]{0,60}") {
            let result = check(&input);
            prop_assert_eq!(result.valid, result.missing.is_empty());
        }
    }
}
