use super::traits::PageSession;
use crate::error::FieldError;
use crate::models::{Field, FieldOutcome, PartialRecord};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const INFO_BOARD: &str = "#__nuxt > section:nth-child(3) > section.main-wrapper > \
     section.main-content > section.block.info-board";

const TITLE_SUFFIX: &str = " - 591租屋網";
const POSTER_SELECTOR: &str = "span.name";
const POSTER_INDEX: usize = 3;

/// The floor image is the last field the site renders, so its presence
/// means the page is ready.
pub fn readiness_marker() -> String {
    format!("{INFO_BOARD} > div.pattern > span:nth-child(5) > img")
}

/// How a value is read off a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Text,
    Attribute(&'static str),
}

/// Reads listing fields from the page the session currently shows.
pub struct FieldExtractor {
    sources: Vec<(Field, String, Lookup)>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    pub fn new() -> Self {
        let pattern = format!("{INFO_BOARD} > div.pattern");
        let sources = vec![
            (Field::City, r#"a.t5-link[href*="region"]"#.to_string(), Lookup::Text),
            (Field::District, r#"a.t5-link[href*="section"]"#.to_string(), Lookup::Text),
            (
                Field::PhoneNumber,
                "section.contact-card > div > div > button > span:nth-child(2) > span".to_string(),
                Lookup::Text,
            ),
            (
                Field::AreaImage,
                format!("{pattern} > span:nth-child(3) > img"),
                Lookup::Attribute("src"),
            ),
            (Field::FloorImage, readiness_marker(), Lookup::Attribute("src")),
            (
                Field::RentImage,
                format!("{INFO_BOARD} > div.house-price > span > strong > img"),
                Lookup::Attribute("src"),
            ),
            (
                Field::AddressImage,
                "#__nuxt > section:nth-child(3) > section.main-wrapper > section.main-content > \
                 section.block.surround > div.address img"
                    .to_string(),
                Lookup::Attribute("src"),
            ),
            (Field::HouseType, format!("{pattern} > span:nth-child(1)"), Lookup::Text),
            (Field::HouseType1, "div.pattern span:last-child".to_string(), Lookup::Text),
        ];
        Self { sources }
    }

    /// Capture the current document and read every field from it.
    pub async fn extract(&self, session: &dyn PageSession) -> PartialRecord {
        match session.document().await {
            Ok(html) => self.extract_from_html(&html),
            Err(e) => {
                debug!("Could not capture document: {}", e);
                PartialRecord::failed(FieldError::Session(e.to_string()))
            }
        }
    }

    pub fn extract_from_html(&self, html: &str) -> PartialRecord {
        let page = Html::parse_document(html);
        let mut partial = PartialRecord::failed(FieldError::Derived);

        partial.set(
            Field::Title,
            read(&page, "title", Lookup::Text)
                .map(|t| t.replace(TITLE_SUFFIX, "").trim().to_string()),
        );

        let (identity, name) = poster(&page);
        partial.set(Field::PosterIdentity, identity);
        partial.set(Field::PosterName, name);

        for (field, selector, lookup) in &self.sources {
            partial.set(*field, read(&page, selector, *lookup));
        }

        for (field, reason) in partial.failures().filter(|(f, _)| !f.is_derived()) {
            debug!("Field {} unavailable: {}", field, reason);
        }
        partial
    }
}

fn parse_selector(selector: &str) -> Result<Selector, FieldError> {
    Selector::parse(selector).map_err(|_| FieldError::InvalidSelector(selector.to_string()))
}

fn read(page: &Html, selector: &str, lookup: Lookup) -> FieldOutcome {
    let sel = parse_selector(selector)?;
    let element = page.select(&sel).next().ok_or_else(|| FieldError::NotFound {
        selector: selector.to_string(),
    })?;
    value_of(element, selector, lookup)
}

fn value_of(element: ElementRef<'_>, selector: &str, lookup: Lookup) -> FieldOutcome {
    match lookup {
        Lookup::Text => Ok(inner_text(element)),
        Lookup::Attribute(name) => element
            .value()
            .attr(name)
            .map(str::to_string)
            .ok_or_else(|| FieldError::MissingAttribute {
                selector: selector.to_string(),
                attribute: name.to_string(),
            }),
    }
}

fn inner_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Identity and name share one element, e.g. `屋主: 王先生`.
fn poster(page: &Html) -> (FieldOutcome, FieldOutcome) {
    let combined = parse_selector(POSTER_SELECTOR).and_then(|sel| {
        let names: Vec<_> = page.select(&sel).collect();
        names
            .get(POSTER_INDEX)
            .map(|el| inner_text(*el))
            .ok_or_else(|| FieldError::IndexOutOfRange {
                selector: POSTER_SELECTOR.to_string(),
                index: POSTER_INDEX,
                len: names.len(),
            })
    });

    match combined {
        Ok(text) => match text.split_once(':') {
            Some((identity, rest)) => {
                // Only the segment up to a second colon names the poster.
                let name = rest.split(':').next().unwrap_or_default();
                (Ok(identity.trim().to_string()), Ok(name.trim().to_string()))
            }
            None => (
                Ok(text.trim().to_string()),
                Err(FieldError::NotFound {
                    selector: format!("{POSTER_SELECTOR} (name after ':')"),
                }),
            ),
        },
        Err(e) => (Err(e.clone()), Err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSession, ListingPage};

    #[test]
    fn test_reads_every_field_from_complete_page() {
        let page = ListingPage::complete();
        let partial = FieldExtractor::new().extract_from_html(&page.html());

        assert_eq!(partial.value(Field::Title), Some("信義區近捷運套房"));
        assert_eq!(partial.value(Field::City), Some("台北市"));
        assert_eq!(partial.value(Field::District), Some("信義區"));
        assert_eq!(partial.value(Field::PosterIdentity), Some("屋主"));
        assert_eq!(partial.value(Field::PosterName), Some("王先生"));
        assert_eq!(partial.value(Field::PhoneNumber), Some("0912-345-678"));
        assert_eq!(partial.value(Field::HouseType), Some("獨立套房"));
        assert_eq!(partial.value(Field::HouseType1), Some("電梯大樓"));
        assert_eq!(partial.value(Field::AreaImage), page.area_src.as_deref());
        assert_eq!(partial.value(Field::FloorImage), page.floor_src.as_deref());
        assert_eq!(partial.value(Field::RentImage), page.rent_src.as_deref());
        assert_eq!(partial.value(Field::AddressImage), page.address_src.as_deref());
        assert_eq!(partial.outcome(Field::Address), &Err(FieldError::Derived));
    }

    #[test]
    fn test_missing_field_does_not_affect_others() {
        let page = ListingPage {
            floor_src: None,
            city: None,
            ..ListingPage::complete()
        };
        let partial = FieldExtractor::new().extract_from_html(&page.html());

        assert!(matches!(
            partial.outcome(Field::FloorImage),
            Err(FieldError::NotFound { .. })
        ));
        assert!(partial.value(Field::City).is_none());
        assert_eq!(partial.value(Field::District), Some("信義區"));
        assert!(partial.value(Field::AreaImage).is_some());
    }

    #[test]
    fn test_poster_without_colon_sets_identity_only() {
        let page = ListingPage {
            poster: Some("仲介".into()),
            ..ListingPage::complete()
        };
        let partial = FieldExtractor::new().extract_from_html(&page.html());

        assert_eq!(partial.value(Field::PosterIdentity), Some("仲介"));
        assert!(partial.value(Field::PosterName).is_none());
    }

    #[test]
    fn test_poster_name_stops_at_second_colon() {
        let page = ListingPage {
            poster: Some("代理人: 陳小姐: 分機12".into()),
            ..ListingPage::complete()
        };
        let partial = FieldExtractor::new().extract_from_html(&page.html());

        assert_eq!(partial.value(Field::PosterIdentity), Some("代理人"));
        assert_eq!(partial.value(Field::PosterName), Some("陳小姐"));
    }

    #[test]
    fn test_missing_poster_element_is_index_error() {
        let page = ListingPage {
            poster: None,
            ..ListingPage::complete()
        };
        let partial = FieldExtractor::new().extract_from_html(&page.html());

        assert!(matches!(
            partial.outcome(Field::PosterIdentity),
            Err(FieldError::IndexOutOfRange { index: 3, len: 3, .. })
        ));
        assert!(partial.value(Field::PosterName).is_none());
    }

    #[test]
    fn test_img_without_src_is_missing_attribute() {
        let html = ListingPage::complete()
            .html()
            .replacen(r#"<img src=""#, r#"<img data-src=""#, 1);
        let partial = FieldExtractor::new().extract_from_html(&html);

        assert!(matches!(
            partial.outcome(Field::AreaImage),
            Err(FieldError::MissingAttribute { .. })
        ));
        assert!(partial.value(Field::FloorImage).is_some());
    }

    #[tokio::test]
    async fn test_unreadable_page_fails_every_field() {
        let session = FakeSession::new(Vec::new());
        let partial = FieldExtractor::new().extract(&session).await;

        assert!(matches!(
            partial.outcome(Field::Title),
            Err(FieldError::Session(_))
        ));
        assert_eq!(partial.failures().count(), 13);
    }
}
