//! Turns recognized lines into field values.
//!
//! The substitutions undo confusions the recognizer makes on the site's
//! image font: the floor slash comes back as `l` or `|`, the rent thousands
//! separator as `.`, and the area unit 坪 as 址.

use serde::{Deserialize, Serialize};

const FLOOR_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorPair {
    pub floor_height: String,
    pub total_floors: String,
}

/// `"3/12"` style floor text. Anything other than exactly two non-empty
/// parts is rejected rather than guessed at.
pub fn parse_floor(lines: &[String]) -> Option<FloorPair> {
    let joined = lines
        .concat()
        .replace('l', "/")
        .replace('|', "/");

    let parts: Vec<&str> = joined.split(FLOOR_SEPARATOR).collect();
    match parts.as_slice() {
        [height, total] if !height.is_empty() && !total.is_empty() => Some(FloorPair {
            floor_height: height.to_string(),
            total_floors: total.to_string(),
        }),
        _ => None,
    }
}

pub fn parse_rent(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    Some(
        lines
            .iter()
            .map(|line| line.replace('.', ","))
            .collect::<Vec<_>>()
            .join("."),
    )
}

pub fn parse_area(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    Some(
        lines
            .iter()
            .map(|line| line.replace('址', "坪"))
            .collect::<Vec<_>>()
            .join("址"),
    )
}
