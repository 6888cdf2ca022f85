use super::traits::PointFile;
use crate::core::models::dipole::{DipolePoint, PointStore};
use nalgebra::Vector3;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, warn};

const FIELDS_PER_RECORD: usize = 6;
const FIELD_NAMES: [&str; FIELDS_PER_RECORD] = ["x", "y", "z", "mx", "my", "mz"];

#[derive(Debug, Error)]
pub enum DipoleFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("expected 6 fields (x y z mx my mz), found {found}")]
    FieldCount { found: usize },
    #[error("invalid float in field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("non-finite value in field '{field}' (value: '{value}')")]
    NonFinite { field: &'static str, value: String },
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// How many records to load from the start of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordLimit {
    #[default]
    All,
    Prefix(usize),
}

impl RecordLimit {
    fn is_reached(&self, loaded: usize) -> bool {
        match self {
            RecordLimit::All => false,
            RecordLimit::Prefix(limit) => loaded >= *limit,
        }
    }
}

/// What to do with a line that is not a valid six-number record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedRecordPolicy {
    /// Fail the whole load with the offending line number.
    #[default]
    Reject,
    /// Drop the line, log a warning, and note it in the [`LoadReport`].
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub limit: RecordLimit,
    pub malformed: MalformedRecordPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub records: usize,
    pub skipped_lines: Vec<usize>,
}

/// Plain-text dipole list: one `x y z mx my mz` record per line, no header.
pub struct DipoleFile;

impl PointFile for DipoleFile {
    type Options = LoadOptions;
    type Report = LoadReport;
    type Error = DipoleFileError;

    fn read_from(
        reader: &mut impl BufRead,
        options: &LoadOptions,
    ) -> Result<(PointStore, LoadReport), DipoleFileError> {
        let mut points = Vec::new();
        let mut report = LoadReport::default();

        let mut buffer = Vec::new();
        let mut line_num = 0usize;

        while !options.limit.is_reached(points.len()) {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            line_num += 1;

            let parsed = match std::str::from_utf8(&buffer) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => parse_record(line),
                Err(_) => Err(ParseErrorKind::InvalidUtf8),
            };

            match parsed {
                Ok(point) => points.push(point),
                Err(kind) => match options.malformed {
                    MalformedRecordPolicy::Reject => {
                        return Err(DipoleFileError::Parse {
                            line: line_num,
                            kind,
                        });
                    }
                    MalformedRecordPolicy::Skip => {
                        warn!("Skipping malformed record on line {}: {}", line_num, kind);
                        report.skipped_lines.push(line_num);
                    }
                },
            }
        }

        if let RecordLimit::Prefix(limit) = options.limit {
            if points.len() < limit {
                debug!(
                    "Requested {} records but the source only holds {}.",
                    limit,
                    points.len()
                );
            }
        }

        report.records = points.len();
        Ok((PointStore::from_points(points), report))
    }

    fn write_to(store: &PointStore, writer: &mut impl Write) -> Result<(), DipoleFileError> {
        for point in store.iter() {
            let r = point.position;
            let m = point.moment;
            writeln!(
                writer,
                "{:e} {:e} {:e} {:e} {:e} {:e}",
                r.x, r.y, r.z, m.x, m.y, m.z
            )?;
        }
        Ok(())
    }
}

fn parse_record(line: &str) -> Result<DipolePoint, ParseErrorKind> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELDS_PER_RECORD {
        return Err(ParseErrorKind::FieldCount {
            found: fields.len(),
        });
    }

    let mut values = [0.0f64; FIELDS_PER_RECORD];
    for (slot, (field, raw)) in values.iter_mut().zip(FIELD_NAMES.into_iter().zip(&fields)) {
        let value: f64 = raw.parse().map_err(|_| ParseErrorKind::InvalidFloat {
            field,
            value: raw.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ParseErrorKind::NonFinite {
                field,
                value: raw.to_string(),
            });
        }
        *slot = value;
    }

    let [x, y, z, mx, my, mz] = values;
    Ok(DipolePoint::new(
        Vector3::new(x, y, z),
        Vector3::new(mx, my, mz),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn read(
        content: &str,
        options: LoadOptions,
    ) -> Result<(PointStore, LoadReport), DipoleFileError> {
        read_bytes(content.as_bytes(), options)
    }

    fn read_bytes(
        content: &[u8],
        options: LoadOptions,
    ) -> Result<(PointStore, LoadReport), DipoleFileError> {
        let mut reader = BufReader::new(Cursor::new(content));
        DipoleFile::read_from(&mut reader, &options)
    }

    const THREE_RECORDS: &str = "\
0.0 0.0 0.0 1.0 0.0 0.0
0.0 0.0 1.0 1.0 0.0 0.0
1e-9\t2.5E-9   -3 0 0.5 -0.5
";

    #[test]
    fn reads_all_records_in_order() {
        let (store, report) = read(THREE_RECORDS, LoadOptions::default()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(report.records, 3);
        assert!(report.skipped_lines.is_empty());
        assert_eq!(store.position(1), Some(&Vector3::new(0.0, 0.0, 1.0)));
        assert_eq!(store.position(2), Some(&Vector3::new(1e-9, 2.5e-9, -3.0)));
        assert_eq!(store.moment(2), Some(&Vector3::new(0.0, 0.5, -0.5)));
    }

    #[test]
    fn prefix_limit_stops_after_requested_records() {
        let options = LoadOptions {
            limit: RecordLimit::Prefix(2),
            ..Default::default()
        };
        let (store, report) = read(THREE_RECORDS, options).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(report.records, 2);
    }

    #[test]
    fn prefix_limit_larger_than_file_does_not_invent_points() {
        let options = LoadOptions {
            limit: RecordLimit::Prefix(10),
            ..Default::default()
        };
        let (store, _) = read(THREE_RECORDS, options).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let content = "\n0 0 0 1 0 0\n   \n0 0 1 1 0 0\n\n";
        let (store, report) = read(content, LoadOptions::default()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(report.skipped_lines.is_empty());
    }

    #[test]
    fn short_record_is_rejected_with_line_number() {
        let content = "0 0 0 1 0 0\n0 0 1 1 0\n";
        let err = read(content, LoadOptions::default()).unwrap_err();
        match err {
            DipoleFileError::Parse { line, kind } => {
                assert_eq!(line, 2);
                assert_eq!(kind, ParseErrorKind::FieldCount { found: 5 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extra_fields_are_rejected() {
        let err = read("0 0 0 1 0 0 7\n", LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DipoleFileError::Parse {
                line: 1,
                kind: ParseErrorKind::FieldCount { found: 7 }
            }
        ));
    }

    #[test]
    fn unparsable_and_non_finite_values_are_reported_by_field() {
        let err = read("0 0 abc 1 0 0\n", LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DipoleFileError::Parse {
                kind: ParseErrorKind::InvalidFloat { field: "z", .. },
                ..
            }
        ));

        let err = read("0 0 0 1 NaN 0\n", LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DipoleFileError::Parse {
                kind: ParseErrorKind::NonFinite { field: "my", .. },
                ..
            }
        ));
    }

    #[test]
    fn skip_policy_drops_malformed_lines_and_records_them() {
        let content = "0 0 0 1 0 0\nbroken line\n0 0 1 1 0 0\n0 0 2\n0 0 3 1 0 0\n";
        let options = LoadOptions {
            malformed: MalformedRecordPolicy::Skip,
            ..Default::default()
        };
        let (store, report) = read(content, options).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(report.skipped_lines, vec![2, 4]);
        assert_eq!(store.position(2), Some(&Vector3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn invalid_utf8_line_follows_malformed_policy() {
        let content = b"0 0 0 1 0 0\n0 0 \xff 1 0 0\n0 0 1 1 0 0\n";

        let skip = LoadOptions {
            malformed: MalformedRecordPolicy::Skip,
            ..Default::default()
        };
        let (store, report) = read_bytes(content, skip).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(report.skipped_lines, vec![2]);
        assert_eq!(store.position(1), Some(&Vector3::new(0.0, 0.0, 1.0)));

        let err = read_bytes(content, LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DipoleFileError::Parse {
                line: 2,
                kind: ParseErrorKind::InvalidUtf8
            }
        ));
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let content = "0 0 0 1 0 0\r\n0 0 1 1 0 0\r\n";
        let (store, _) = read(content, LoadOptions::default()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn skipped_lines_do_not_count_towards_prefix_limit() {
        let content = "bad\n0 0 0 1 0 0\nbad\n0 0 1 1 0 0\n0 0 2 1 0 0\n";
        let options = LoadOptions {
            limit: RecordLimit::Prefix(2),
            malformed: MalformedRecordPolicy::Skip,
        };
        let (store, report) = read(content, options).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(report.skipped_lines, vec![1, 3]);
    }

    #[test]
    fn write_then_read_preserves_points() {
        let (store, _) = read(THREE_RECORDS, LoadOptions::default()).unwrap();
        let mut buffer = Vec::new();
        DipoleFile::write_to(&store, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let (reread, _) = read(&text, LoadOptions::default()).unwrap();
        assert_eq!(reread, store);
    }

    #[test]
    fn written_file_reads_back_through_paths() {
        let (store, _) = read(THREE_RECORDS, LoadOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dipoles");

        DipoleFile::write_to_path(&store, &path).unwrap();
        // A second write truncates rather than appends.
        DipoleFile::write_to_path(&store, &path).unwrap();

        let (reread, report) = DipoleFile::read_from_path(&path, &LoadOptions::default()).unwrap();
        assert_eq!(report.records, 3);
        assert_eq!(reread, store);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            DipoleFile::read_from_path(dir.path().join("absent"), &LoadOptions::default());
        assert!(matches!(result, Err(DipoleFileError::Io(_))));
    }
}
