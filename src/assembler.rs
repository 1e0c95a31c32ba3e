use crate::models::{ListingRecord, OutputRecord, PLACEHOLDER};
use crate::normalize::FloorPair;
use crate::ocr::RecognizedText;

/// Values derived from the image fields of one listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedValues {
    pub address: RecognizedText,
    pub area: Option<String>,
    pub floor: Option<FloorPair>,
    pub rent: Option<String>,
}

pub fn assemble(record: &ListingRecord, derived: &DerivedValues) -> OutputRecord {
    let (floor_height, total_floors) = match &derived.floor {
        Some(pair) => (Some(pair.floor_height.as_str()), Some(pair.total_floors.as_str())),
        None => (None, None),
    };

    OutputRecord {
        title: or_placeholder(record.title.as_deref()),
        address: or_placeholder(derived.address.first()),
        city: or_placeholder(record.city.as_deref()),
        district: or_placeholder(record.district.as_deref()),
        poster_identity: or_placeholder(record.poster_identity.as_deref()),
        poster_name: or_placeholder(record.poster_name.as_deref()),
        phone_number: or_placeholder(record.phone_number.as_deref()),
        house_type: or_placeholder(record.house_type.as_deref()),
        house_type_1: or_placeholder(record.house_type_1.as_deref()),
        area: or_placeholder(derived.area.as_deref()),
        floor_height: or_placeholder(floor_height),
        total_floors: or_placeholder(total_floors),
        rent: or_placeholder(derived.rent.as_deref()),
    }
}

// An empty string never counts as a resolved value.
fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}
