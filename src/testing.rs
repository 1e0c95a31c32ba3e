//! Fakes for the browser, recognizer and poller seams.

use crate::error::{OcrError, SessionError};
use crate::ocr::{BoundingBox, Detection, RecognitionInput, TextRecognizer};
use crate::scrapers::{PageSession, Poller};
use async_trait::async_trait;
use base64::Engine;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

/// Browser stand-in that serves canned documents.
pub struct FakeSession {
    /// Document served after the n-th navigation; the last one repeats.
    documents: Vec<String>,
    /// Readiness marker appears from this navigation on (1-based).
    marker_from_navigation: Option<usize>,
    fail_navigation: bool,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    navigations: usize,
    polls: usize,
    urls: Vec<String>,
}

impl FakeSession {
    pub fn new(documents: Vec<String>) -> Self {
        Self {
            documents,
            marker_from_navigation: Some(1),
            fail_navigation: false,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn marker_from(mut self, navigation: Option<usize>) -> Self {
        self.marker_from_navigation = navigation;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn navigations(&self) -> usize {
        self.state.lock().unwrap().navigations
    }

    pub fn polls(&self) -> usize {
        self.state.lock().unwrap().polls
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().urls.clone()
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.navigations += 1;
        state.urls.push(url.to_string());
        if self.fail_navigation {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                reason: "connection refused".into(),
            });
        }
        Ok(())
    }

    async fn is_present(&self, _selector: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        state.polls += 1;
        match self.marker_from_navigation {
            Some(n) => state.navigations >= n,
            None => false,
        }
    }

    async fn document(&self) -> Result<String, SessionError> {
        let state = self.state.lock().unwrap();
        if self.documents.is_empty() {
            return Err(SessionError::Browser("no document".into()));
        }
        let idx = state.navigations.saturating_sub(1).min(self.documents.len() - 1);
        Ok(self.documents[idx].clone())
    }
}

/// Records pauses instead of sleeping.
#[derive(Default)]
pub struct InstantPoller {
    pauses: Mutex<Vec<Duration>>,
}

impl InstantPoller {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Poller for InstantPoller {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    File,
    Image,
}

/// Deterministic recognizer keyed on image width, so each fake image can
/// carry its own answer.
#[derive(Default)]
pub struct FakeRecognizer {
    answers: HashMap<u32, Vec<String>>,
    fail: bool,
    calls: Mutex<Vec<(InputKind, u32)>>,
}

impl FakeRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn answer(mut self, width: u32, lines: &[&str]) -> Self {
        self.answers
            .insert(width, lines.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<(InputKind, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextRecognizer for FakeRecognizer {
    async fn recognize(&self, input: &RecognitionInput) -> Result<Vec<Detection>, OcrError> {
        if self.fail {
            return Err(OcrError::Malformed("fake failure".into()));
        }
        let (kind, width) = match input {
            RecognitionInput::File(path) => (InputKind::File, image::open(path)?.width()),
            RecognitionInput::Image(img) => (InputKind::Image, img.width()),
        };
        self.calls.lock().unwrap().push((kind, width));
        Ok(self
            .answers
            .get(&width)
            .map(|lines| {
                lines
                    .iter()
                    .map(|text| Detection {
                        bbox: BoundingBox::default(),
                        text: text.clone(),
                        confidence: 0.99,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Encode a solid-color PNG as a `data:` URI.
pub fn png_data_uri(width: u32, height: u32, color: [u8; 4]) -> String {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

pub fn dimensions(path: &std::path::Path) -> (u32, u32) {
    image::open(path).unwrap().dimensions()
}

/// A listing page in the 591 layout. `None` leaves the element out.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub title: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub poster: Option<String>,
    pub phone: Option<String>,
    pub house_type: Option<String>,
    pub house_type_1: Option<String>,
    pub area_src: Option<String>,
    pub floor_src: Option<String>,
    pub rent_src: Option<String>,
    pub address_src: Option<String>,
}

impl ListingPage {
    pub fn complete() -> Self {
        Self {
            title: Some("信義區近捷運套房 - 591租屋網".into()),
            city: Some("台北市".into()),
            district: Some("信義區".into()),
            poster: Some("屋主: 王先生".into()),
            phone: Some("0912-345-678".into()),
            house_type: Some("獨立套房".into()),
            house_type_1: Some("電梯大樓".into()),
            area_src: Some(png_data_uri(11, 4, [200, 200, 200, 255])),
            floor_src: Some(png_data_uri(12, 4, [200, 200, 200, 255])),
            rent_src: Some(png_data_uri(13, 4, [200, 200, 200, 255])),
            address_src: Some(png_data_uri(14, 4, [200, 200, 200, 255])),
        }
    }

    pub fn html(&self) -> String {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let img = |v: &Option<String>| match v {
            Some(src) => format!(r#"<img src="{src}">"#),
            None => String::new(),
        };
        let title = match &self.title {
            Some(t) => format!("<title>{t}</title>"),
            None => String::new(),
        };
        let poster = match &self.poster {
            Some(p) => format!(r#"<span class="name">{p}</span>"#),
            None => String::new(),
        };
        let phone = match &self.phone {
            Some(p) => format!(
                r#"<section class="contact-card"><div><div><button><span>call</span><span><span>{p}</span></span></button></div></div></section>"#
            ),
            None => String::new(),
        };
        let links = [
            self.city.as_ref().map(|c| format!(r#"<a class="t5-link" href="/list?region=1">{c}</a>"#)),
            self.district.as_ref().map(|d| format!(r#"<a class="t5-link" href="/list?section=7">{d}</a>"#)),
        ]
        .into_iter()
        .flatten()
        .collect::<String>();

        format!(
            r#"<!DOCTYPE html>
<html><head>{title}</head><body>
<div id="__nuxt">
  <header>{links}</header>
  <section class="nav"></section>
  <section>
    <section class="main-wrapper">
      <section class="main-content">
        <section class="block info-board">
          <div class="pattern">
            <span>{house_type}</span>
            <i></i>
            <span>{area}</span>
            <i></i>
            <span>{floor}</span>
            <i></i>
            <span>{house_type_1}</span>
          </div>
          <div class="house-price"><span><strong>{rent}</strong></span></div>
        </section>
        <section class="block surround"><div class="address"><p>{address}</p></div></section>
      </section>
    </section>
  </section>
  <aside>
    <span class="name">a</span><span class="name">b</span><span class="name">c</span>
    {poster}
    {phone}
  </aside>
</div>
</body></html>"#,
            house_type = text(&self.house_type),
            area = img(&self.area_src),
            floor = img(&self.floor_src),
            house_type_1 = text(&self.house_type_1),
            rent = img(&self.rent_src),
            address = img(&self.address_src),
        )
    }
}
