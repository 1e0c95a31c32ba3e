use crate::assembler::{assemble, DerivedValues};
use crate::imaging::{image_stem, ImageFieldResolver, ImageStore, ADDRESS_IMAGE_DIR, AREA_IMAGE_DIR};
use crate::models::{ListingRecord, OutputRecord};
use crate::normalize::{parse_area, parse_floor, parse_rent};
use crate::ocr::TextRecognizer;
use crate::scrapers::{
    readiness_marker, AttemptMerger, FieldExtractor, PageLoader, PageSession, PipelineSettings, Poller,
};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// One URL per line; surrounding whitespace and blank lines are ignored.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;
    Ok(parse_url_list(&contents))
}

/// Drives every listing URL through load, extract, resolve and assemble.
pub struct ListingPipeline<'a> {
    session: &'a dyn PageSession,
    recognizer: &'a dyn TextRecognizer,
    poller: &'a dyn Poller,
    settings: PipelineSettings,
    extractor: FieldExtractor,
    marker: String,
    area_store: ImageStore,
    address_store: ImageStore,
}

impl<'a> ListingPipeline<'a> {
    pub fn new(
        session: &'a dyn PageSession,
        recognizer: &'a dyn TextRecognizer,
        poller: &'a dyn Poller,
        settings: PipelineSettings,
        image_root: &Path,
    ) -> Self {
        Self {
            session,
            recognizer,
            poller,
            settings,
            extractor: FieldExtractor::new(),
            marker: readiness_marker(),
            area_store: ImageStore::new(image_root.join(AREA_IMAGE_DIR)),
            address_store: ImageStore::new(image_root.join(ADDRESS_IMAGE_DIR)),
        }
    }

    /// Exactly one record per URL, in input order.
    pub async fn run(&mut self, urls: &[String]) -> Vec<OutputRecord> {
        let mut records = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, urls.len(), url);
            records.push(self.process(url).await);
            self.poller.pause(self.settings.inter_url_delay).await;
        }

        records
    }

    pub async fn process(&mut self, url: &str) -> OutputRecord {
        let record = self.collect(url).await;
        let derived = self.derive(&record).await;
        assemble(&record, &derived)
    }

    /// Load and extract until every field is filled or attempts run out.
    async fn collect(&self, url: &str) -> ListingRecord {
        let loader = PageLoader::new(
            self.session,
            self.poller,
            self.settings.readiness.clone(),
            &self.marker,
        );
        let merger = AttemptMerger::new(self.settings.max_attempts);

        let mut record = ListingRecord::default();
        for attempt in 1..=merger.max_attempts() {
            if !loader.load(url).await {
                warn!("Extracting from a partially rendered page (attempt {})", attempt);
            }
            let partial = self.extractor.extract(self.session).await;
            let outcome = merger.merge(&record, &partial, attempt);
            record = outcome.record;
            if outcome.done {
                break;
            }
        }
        record
    }

    async fn derive(&mut self, record: &ListingRecord) -> DerivedValues {
        let resolver = ImageFieldResolver::new(self.recognizer);
        let stem = image_stem(record.title.as_deref());

        let area = resolver
            .resolve(record.area_image.as_deref(), Some(&mut self.area_store), &stem)
            .await;
        let address = resolver
            .resolve(record.address_image.as_deref(), Some(&mut self.address_store), &stem)
            .await;
        let floor = resolver.resolve(record.floor_image.as_deref(), None, &stem).await;
        let rent = resolver.resolve(record.rent_image.as_deref(), None, &stem).await;

        DerivedValues {
            address: address.text,
            area: parse_area(area.text.lines()),
            floor: parse_floor(floor.text.lines()),
            rent: parse_rent(rent.text.lines()),
        }
    }
}
