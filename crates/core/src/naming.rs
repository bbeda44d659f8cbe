use crate::metadata::FileRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const TEMP_PREFIX: &str = ".chronorename_tmp_";
const KEY_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameEntry {
    pub original: PathBuf,
    pub temporary: PathBuf,
    pub target: PathBuf,
    pub timestamp: NaiveDateTime,
}

impl RenameEntry {
    pub fn changed(&self) -> bool {
        self.original != self.target
    }
}

pub fn timestamp_key(timestamp: &NaiveDateTime) -> String {
    timestamp.format(KEY_FORMAT).to_string()
}

/// Records without a timestamp are ignored. Same-second files are ordered by
/// original name, the first keeps the bare key and later ones get `_1`, `_2`, ...
pub fn assign_names(records: &[FileRecord]) -> Vec<RenameEntry> {
    let mut resolved: Vec<(&FileRecord, NaiveDateTime)> = records
        .iter()
        .filter_map(|record| record.timestamp().map(|ts| (record, ts)))
        .collect();
    resolved.sort_by(|(a, a_ts), (b, b_ts)| a_ts.cmp(b_ts).then_with(|| a.name().cmp(b.name())));

    let mut seen = HashMap::<String, usize>::new();
    resolved
        .into_iter()
        .map(|(record, timestamp)| {
            let key = timestamp_key(&timestamp);
            let prior = seen.entry(key.clone()).or_insert(0);
            let base = if *prior == 0 {
                key
            } else {
                format!("{key}_{prior}")
            };
            *prior += 1;

            let extension = lowercase_extension(record.name());
            let parent = record.name().parent().unwrap_or_else(|| Path::new(""));
            RenameEntry {
                original: record.name().to_path_buf(),
                temporary: parent.join(format!("{TEMP_PREFIX}{}{extension}", Uuid::new_v4().simple())),
                target: parent.join(format!("{base}{extension}")),
                timestamp,
            }
        })
        .collect()
}

/// Everything from the last `.` of the file name, so `.jpg` keeps `.jpg`.
fn lowercase_extension(name: &Path) -> String {
    let file_name = name
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_default();
    file_name
        .rfind('.')
        .map(|index| file_name[index..].to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{assign_names, timestamp_key, TEMP_PREFIX};
    use crate::error::ResolveError;
    use crate::metadata::{FileRecord, Resolution, TimestampSource};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, 1)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .expect("valid date")
    }

    fn record(name: &str, ts: NaiveDateTime) -> FileRecord {
        let mut record = FileRecord::new(PathBuf::from(name), TimestampSource::Exif);
        record.resolution = Resolution::Resolved(ts);
        record
    }

    fn targets(records: &[FileRecord]) -> Vec<String> {
        assign_names(records)
            .into_iter()
            .map(|entry| entry.target.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn key_is_fixed_width() {
        assert_eq!(timestamp_key(&at(9, 5, 3)), "20210101_090503");
    }

    #[test]
    fn same_second_files_get_ordered_suffixes() {
        let records = vec![
            record("b.jpg", at(10, 0, 0)),
            record("a.jpg", at(10, 0, 0)),
            record("c.jpg", at(9, 0, 0)),
            record("d.jpg", at(10, 0, 0)),
        ];

        let entries = assign_names(&records);
        let by_original: Vec<(String, String)> = entries
            .iter()
            .map(|e| {
                (
                    e.original.to_string_lossy().to_string(),
                    e.target.to_string_lossy().to_string(),
                )
            })
            .collect();
        assert_eq!(
            by_original,
            vec![
                ("c.jpg".to_string(), "20210101_090000.jpg".to_string()),
                ("a.jpg".to_string(), "20210101_100000.jpg".to_string()),
                ("b.jpg".to_string(), "20210101_100000_1.jpg".to_string()),
                ("d.jpg".to_string(), "20210101_100000_2.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn subsecond_differences_share_a_bucket() {
        let base = at(10, 0, 0);
        let records = vec![
            record("a.jpg", base),
            record("b.jpg", base + Duration::milliseconds(400)),
        ];
        assert_eq!(
            targets(&records),
            vec!["20210101_100000.jpg", "20210101_100000_1.jpg"]
        );
    }

    #[test]
    fn extension_is_lowercased_and_optional() {
        let records = vec![record("IMG.JPEG", at(8, 0, 0)), record("raw", at(7, 0, 0))];
        assert_eq!(targets(&records), vec!["20210101_070000", "20210101_080000.jpeg"]);
    }

    #[test]
    fn dot_only_name_keeps_its_extension() {
        let records = vec![
            record(".jpg", at(10, 0, 0)),
            record(".JPG", at(11, 0, 0)),
            record("archive.tar.GZ", at(12, 0, 0)),
        ];
        assert_eq!(
            targets(&records),
            vec![
                "20210101_100000.jpg",
                "20210101_110000.jpg",
                "20210101_120000.gz",
            ]
        );
    }

    #[test]
    fn unresolved_records_are_skipped() {
        let mut failed = FileRecord::new(PathBuf::from("x.jpg"), TimestampSource::Exif);
        failed.resolution = Resolution::Failed(ResolveError::MissingCaptureTime);
        let records = vec![failed, record("a.jpg", at(10, 0, 0))];

        let entries = assign_names(&records);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].original, PathBuf::from("a.jpg"));
    }

    #[test]
    fn temporary_names_are_unique_hidden_and_keep_extension() {
        let records: Vec<FileRecord> = (0..50)
            .map(|i| record(&format!("IMG_{i:04}.JPG"), at(10, 0, 0)))
            .collect();
        let entries = assign_names(&records);

        let temps: HashSet<_> = entries.iter().map(|e| e.temporary.clone()).collect();
        assert_eq!(temps.len(), entries.len());
        for entry in &entries {
            let name = entry.temporary.to_string_lossy();
            assert!(name.starts_with(TEMP_PREFIX));
            assert!(name.ends_with(".jpg"));
        }
    }

    #[test]
    fn targets_are_pairwise_unique_for_dense_batches() {
        let records: Vec<FileRecord> = (0..300)
            .map(|i| {
                let ts = at(10, 0, 0) + Duration::seconds(i64::from(i % 7));
                let ext = if i % 3 == 0 { "JPG" } else { "jpg" };
                record(&format!("IMG_{i:04}.{ext}"), ts)
            })
            .collect();

        let entries = assign_names(&records);
        let unique: HashSet<_> = entries.iter().map(|e| e.target.clone()).collect();
        assert_eq!(unique.len(), records.len());
    }

    #[test]
    fn nested_files_stay_in_their_directory() {
        let records = vec![record("2021/jan/a.jpg", at(10, 0, 0))];
        let entries = assign_names(&records);
        assert_eq!(entries[0].target, PathBuf::from("2021/jan/20210101_100000.jpg"));
        assert!(entries[0].temporary.starts_with("2021/jan"));
    }
}
