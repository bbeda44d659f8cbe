use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const CAPTURE_TIME_FORMATS: [&str; 2] = ["%Y:%m:%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

pub trait CaptureTimeDecoder: Sync {
    /// Raw capture-time text, or `None` when the file carries no such field.
    fn read_capture_time(&self, path: &Path) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExifDecoder;

impl CaptureTimeDecoder for ExifDecoder {
    fn read_capture_time(&self, path: &Path) -> Result<Option<String>> {
        let file = File::open(path)
            .with_context(|| format!("EXIF読み込み対象を開けませんでした: {}", path.display()))?;
        let mut buf = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut buf)
            .with_context(|| format!("EXIFを解析できませんでした: {}", path.display()))?;

        let raw = exif
            .get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .and_then(|field| match &field.value {
                Value::Ascii(values) => values.first().map(|v| String::from_utf8_lossy(v).into_owned()),
                _ => None,
            });

        Ok(normalize(raw))
    }
}

pub fn parse_capture_time(input: &str) -> Option<NaiveDateTime> {
    let normalized = input.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    CAPTURE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(normalized, fmt).ok())
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string())
        .filter(|v| !v.is_empty())
}
