use super::{BoundingBox, Detection, RecognitionInput, TextRecognizer};
use crate::error::OcrError;
use async_trait::async_trait;
use image::ImageFormat;
use std::io::Cursor;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

const TSV_COLUMNS: usize = 12;
const WORD_LEVEL: u32 = 5;

/// Recognition backed by the `tesseract` command line tool.
pub struct TesseractRecognizer {
    binary: PathBuf,
    language: String,
    page_segmentation: u8,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>, page_segmentation: u8) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            page_segmentation,
        }
    }

    fn command(&self, source: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(source)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation.to_string())
            .arg("tsv")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> OcrError {
        OcrError::Spawn {
            binary: self.binary.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, input: &RecognitionInput) -> Result<Vec<Detection>, OcrError> {
        let output = match input {
            RecognitionInput::File(path) => {
                debug!("Running tesseract on {}", path.display());
                self.command(&path.to_string_lossy())
                    .stdin(Stdio::null())
                    .output()
                    .await
                    .map_err(|e| self.spawn_error(e))?
            }
            RecognitionInput::Image(img) => {
                let mut png = Vec::new();
                img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
                debug!("Running tesseract on {} byte in-memory PNG", png.len());

                let mut child = self
                    .command("stdin")
                    .stdin(Stdio::piped())
                    .spawn()
                    .map_err(|e| self.spawn_error(e))?;
                if let Some(mut stdin) = child.stdin.take() {
                    stdin.write_all(&png).await?;
                }
                child.wait_with_output().await?
            }
        };

        if !output.status.success() {
            return Err(OcrError::Engine {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Group tesseract's word rows into one detection per text line.
pub(crate) fn parse_tsv(tsv: &str) -> Result<Vec<Detection>, OcrError> {
    let mut rows = tsv.lines();
    match rows.next() {
        Some(header) if header.starts_with("level") => {}
        Some(other) => return Err(OcrError::Malformed(format!("unexpected header `{other}`"))),
        None => return Ok(Vec::new()),
    }

    // (page, block, paragraph, line) -> detection under construction
    let mut lines: Vec<((u32, u32, u32, u32), Detection, u32)> = Vec::new();

    for row in rows.filter(|r| !r.trim().is_empty()) {
        let cols: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if cols.len() < TSV_COLUMNS - 1 {
            return Err(OcrError::Malformed(format!("short row `{row}`")));
        }
        let num = |i: usize| -> Result<u32, OcrError> {
            cols[i]
                .trim()
                .parse()
                .map_err(|_| OcrError::Malformed(format!("bad number `{}` in `{row}`", cols[i])))
        };

        if num(0)? != WORD_LEVEL {
            continue;
        }
        let conf: f32 = cols[10]
            .trim()
            .parse()
            .map_err(|_| OcrError::Malformed(format!("bad confidence in `{row}`")))?;
        let text = cols.get(11).map(|t| t.trim()).unwrap_or("");
        if conf < 0.0 || text.is_empty() {
            continue;
        }

        let key = (num(1)?, num(2)?, num(3)?, num(4)?);
        let bbox = BoundingBox {
            left: num(6)?,
            top: num(7)?,
            width: num(8)?,
            height: num(9)?,
        };

        match lines.iter().position(|(k, _, _)| *k == key) {
            Some(idx) => {
                let (_, line, words) = &mut lines[idx];
                if needs_space(&line.text, text) {
                    line.text.push(' ');
                }
                line.text.push_str(text);
                line.bbox = line.bbox.union(&bbox);
                line.confidence += conf / 100.0;
                *words += 1;
            }
            None => lines.push((
                key,
                Detection {
                    bbox,
                    text: text.to_string(),
                    confidence: conf / 100.0,
                },
                1,
            )),
        }
    }

    Ok(lines
        .into_iter()
        .map(|(_, mut line, words)| {
            line.confidence /= words as f32;
            line
        })
        .collect())
}

// Latin words are separated by spaces, CJK glyphs are not.
fn needs_space(left: &str, right: &str) -> bool {
    let ends = left.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    let starts = right.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    ends && starts
}
