//! Normalization between upstream, local, and outbound shapes.
//!
//! Every function here is pure and total. Open-set strings from the
//! upstream catalog are resolved against the enum labels with a
//! case-insensitive exact match; anything else becomes `Unknown`.

use crate::models::{Character, CharacterView, ExternalCharacter, Gender, NewCharacter, Status};

/// Single-character case mapping; characters whose full mapping expands to
/// several characters (`ß` → `SS`) map to themselves.
fn simple_case(c: char, mut mapped: impl Iterator<Item = char>) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(m), None) => m,
        _ => c,
    }
}

/// Fold one character for case-insensitive comparison: upper-case it, then
/// lower-case the result. `ı` folds to `i` and the Kelvin sign to `k`.
pub fn fold_case(c: char) -> char {
    let upper = simple_case(c, c.to_uppercase());
    simple_case(upper, upper.to_lowercase())
}

fn label_matches(label: &str, raw: &str) -> bool {
    label.chars().count() == raw.chars().count()
        && label
            .chars()
            .zip(raw.chars())
            .all(|(a, b)| a == b || fold_case(a) == fold_case(b))
}

pub fn status_from_label(raw: &str) -> Status {
    Status::ALL
        .into_iter()
        .find(|s| label_matches(s.label(), raw))
        .unwrap_or(Status::Unknown)
}

pub fn gender_from_label(raw: &str) -> Gender {
    Gender::ALL
        .into_iter()
        .find(|g| label_matches(g.label(), raw))
        .unwrap_or(Gender::Unknown)
}

/// Upstream record → local entity. The external id is kept verbatim;
/// the local id is left to the store.
pub fn to_local(record: &ExternalCharacter) -> NewCharacter {
    NewCharacter {
        external_id: record.id,
        name: record.name.clone(),
        status: status_from_label(record.status.as_deref().unwrap_or("")),
        gender: gender_from_label(record.gender.as_deref().unwrap_or("")),
    }
}

pub fn to_view(character: &Character) -> CharacterView {
    CharacterView {
        id: character.id,
        external_id: character.external_id,
        name: character.name.clone(),
        status: character.status,
        gender: character.gender,
    }
}
