use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Substitute for any value that never resolved ("value unavailable").
pub const PLACEHOLDER: &str = "無法取得";

/// The fixed set of slots a listing page is read into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    AddressImage,
    City,
    District,
    PosterIdentity,
    PosterName,
    PhoneNumber,
    AreaImage,
    FloorImage,
    RentImage,
    HouseType,
    HouseType1,
    /// Filled from recognition of the address image, never from the DOM.
    Address,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Title,
        Field::AddressImage,
        Field::City,
        Field::District,
        Field::PosterIdentity,
        Field::PosterName,
        Field::PhoneNumber,
        Field::AreaImage,
        Field::FloorImage,
        Field::RentImage,
        Field::HouseType,
        Field::HouseType1,
        Field::Address,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::AddressImage => "address_image",
            Field::City => "city",
            Field::District => "district",
            Field::PosterIdentity => "poster_identity",
            Field::PosterName => "poster_name",
            Field::PhoneNumber => "phone_number",
            Field::AreaImage => "area_image",
            Field::FloorImage => "floor_image",
            Field::RentImage => "rent_image",
            Field::HouseType => "house_type",
            Field::HouseType1 => "house_type_1",
            Field::Address => "address",
        }
    }

    /// Derived fields do not take part in the completeness check.
    pub fn is_derived(self) -> bool {
        matches!(self, Field::Address)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Accumulated values for one listing across load attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: Option<String>,
    pub address_image: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub poster_identity: Option<String>,
    pub poster_name: Option<String>,
    pub phone_number: Option<String>,
    pub area_image: Option<String>,
    pub floor_image: Option<String>,
    pub rent_image: Option<String>,
    pub house_type: Option<String>,
    pub house_type_1: Option<String>,
    pub address: Option<String>,
}

impl ListingRecord {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Returns a copy with `field` set to `value`.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        *self.slot_mut(field) = Some(value.into());
        self
    }

    /// Non-derived fields that are still empty.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !f.is_derived() && self.get(*f).is_none())
            .collect()
    }

    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Title => &self.title,
            Field::AddressImage => &self.address_image,
            Field::City => &self.city,
            Field::District => &self.district,
            Field::PosterIdentity => &self.poster_identity,
            Field::PosterName => &self.poster_name,
            Field::PhoneNumber => &self.phone_number,
            Field::AreaImage => &self.area_image,
            Field::FloorImage => &self.floor_image,
            Field::RentImage => &self.rent_image,
            Field::HouseType => &self.house_type,
            Field::HouseType1 => &self.house_type_1,
            Field::Address => &self.address,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::AddressImage => &mut self.address_image,
            Field::City => &mut self.city,
            Field::District => &mut self.district,
            Field::PosterIdentity => &mut self.poster_identity,
            Field::PosterName => &mut self.poster_name,
            Field::PhoneNumber => &mut self.phone_number,
            Field::AreaImage => &mut self.area_image,
            Field::FloorImage => &mut self.floor_image,
            Field::RentImage => &mut self.rent_image,
            Field::HouseType => &mut self.house_type,
            Field::HouseType1 => &mut self.house_type_1,
            Field::Address => &mut self.address,
        }
    }
}

pub type FieldOutcome = Result<String, FieldError>;

/// The result of a single extraction attempt: a value or a failure reason
/// for every field.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord {
    outcomes: BTreeMap<Field, FieldOutcome>,
}

impl PartialRecord {
    /// Every field failed for the same reason, e.g. the page could not be read.
    pub fn failed(reason: FieldError) -> Self {
        let outcomes = Field::ALL
            .into_iter()
            .map(|f| {
                let outcome = if f.is_derived() {
                    Err(FieldError::Derived)
                } else {
                    Err(reason.clone())
                };
                (f, outcome)
            })
            .collect();
        Self { outcomes }
    }

    pub fn set(&mut self, field: Field, outcome: FieldOutcome) {
        self.outcomes.insert(field, outcome);
    }

    pub fn outcome(&self, field: Field) -> &FieldOutcome {
        // Every constructor populates all fields.
        &self.outcomes[&field]
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        self.outcome(field).as_ref().ok().map(String::as_str)
    }

    pub fn failures(&self) -> impl Iterator<Item = (Field, &FieldError)> {
        self.outcomes
            .iter()
            .filter_map(|(f, o)| o.as_ref().err().map(|e| (*f, e)))
    }
}

/// Final flattened record written to the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub title: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub poster_identity: String,
    pub poster_name: String,
    pub phone_number: String,
    pub house_type: String,
    pub house_type_1: String,
    pub area: String,
    pub floor_height: String,
    pub total_floors: String,
    pub rent: String,
}
