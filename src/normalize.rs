// Division key normalization.
//
// The sheet labels divisions as free text, e.g.
// `"Changanassery Municipality, Kottayam District"`. Both the type
// classification and the label cleanup are driven by the ordered tables
// below so each rule can be tested on its own.
use crate::types::{DivisionType, Lsgd, Row};
use crate::util::{count_occurrences, strip_trailing_word};

#[derive(Debug, Clone, Copy)]
pub enum LabelPattern {
    Contains(&'static str),
    RepeatedAtLeast(&'static str, usize),
}

impl LabelPattern {
    pub fn matches(self, label: &str) -> bool {
        match self {
            LabelPattern::Contains(word) => label.contains(word),
            LabelPattern::RepeatedAtLeast(word, n) => count_occurrences(label, word) >= n,
        }
    }
}

/// First matching rule wins; labels matching none are `FALLBACK_TYPE`.
pub const TYPE_RULES: &[(LabelPattern, DivisionType)] = &[
    (LabelPattern::RepeatedAtLeast("District", 2), DivisionType::District),
    (LabelPattern::Contains("District Panchayat"), DivisionType::District),
    (LabelPattern::Contains("Grama"), DivisionType::Grama),
    (LabelPattern::Contains("Block"), DivisionType::Block),
    (LabelPattern::Contains("Muncipality"), DivisionType::Municipality),
    (LabelPattern::Contains("Municipality"), DivisionType::Municipality),
];

pub const FALLBACK_TYPE: DivisionType = DivisionType::Corporation;

/// Trailing administrative tokens removed from division names. Longer
/// phrases come before their shorter tails.
pub const STRIP_SUFFIXES: &[&str] = &[
    "District Panchayat",
    "Grama Panchayat",
    "Block Panchayat",
    "Municipality",
    "Muncipality",
    "Corporation",
    "District",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionKey {
    pub district: String,
    pub name: String,
    pub kind: DivisionType,
}

pub fn classify(label: &str) -> DivisionType {
    TYPE_RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(label))
        .map(|(_, kind)| *kind)
        .unwrap_or(FALLBACK_TYPE)
}

pub fn clean_district(district: &str) -> String {
    let d = district.trim();
    strip_trailing_word(d, "District").unwrap_or(d).to_string()
}

/// Clean a division label: drop the `", <district>"` repetition, then every
/// trailing administrative token until none is left.
pub fn clean_division_name(label: &str, district: &str) -> String {
    let mut name = label.trim();

    let raw_district = district.trim();
    let district = clean_district(district);
    for candidate in [raw_district, district.as_str()] {
        if candidate.is_empty() {
            continue;
        }
        let stripped = name
            .strip_suffix(candidate)
            .map(str::trim_end)
            .and_then(|rest| rest.strip_suffix(','));
        if let Some(rest) = stripped {
            name = rest.trim();
            break;
        }
    }

    'strip: loop {
        for suffix in STRIP_SUFFIXES {
            if let Some(rest) = strip_trailing_word(name, suffix) {
                name = rest;
                continue 'strip;
            }
        }
        break;
    }

    name.trim().to_string()
}

pub fn normalize(label: &str, district: &str) -> DivisionKey {
    DivisionKey {
        district: clean_district(district),
        name: clean_division_name(label, district),
        kind: classify(label),
    }
}

/// Open a new, empty division from a row.
pub fn division_from_row(row: &Row) -> Lsgd {
    let key = normalize(&row.lsg, &row.district_name);
    Lsgd {
        district: key.district,
        lsg: key.name,
        wards: Vec::new(),
        kind: key.kind,
        raw_label: row.lsg.clone(),
    }
}
