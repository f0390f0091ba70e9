use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    config::FormatSpec,
    error::{Error, Result},
    timestamp::TimestampToken,
};

/// What to do with one data-region line.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// Structurally not a data record; contributes nothing to the output.
    Skip,
    /// Looks like a record but the timestamp cannot be safely rewritten;
    /// emitted verbatim without touching offset tracking.
    PassThrough,
    /// Timestamp rewritten for continuity.
    Rewrite { line: String, timestamp: f64 },
}

/// Totals for one merge run.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeSummary {
    pub files: usize,
    pub records: usize,
}

/// State carried across the input files of a single merge run.
///
/// All mutable merge state lives here, so independent runs never interfere.
pub struct MergeSession {
    spec: FormatSpec,
    marker_lower: String,
    offset: f64,
    header_written: bool,
}

impl MergeSession {
    #[must_use]
    pub fn new(spec: FormatSpec) -> Self {
        let marker_lower = spec.marker.to_lowercase();
        MergeSession {
            spec,
            marker_lower,
            offset: 0.0,
            header_written: false,
        }
    }

    fn is_marker(&self, stripped: &str) -> bool {
        stripped.to_lowercase().starts_with(&self.marker_lower)
    }

    fn dispatch(&self, line: &str) -> Outcome {
        // A record needs a leading token and a non-empty remainder
        let Some((token, rest)) = split_record(line) else {
            return Outcome::Skip;
        };
        let Some(ts) = TimestampToken::parse(token) else {
            return Outcome::Skip;
        };
        match ts.rewrite(self.offset) {
            Some((timestamp, text)) => Outcome::Rewrite {
                line: format!("{text} {rest}"),
                timestamp,
            },
            None => Outcome::PassThrough,
        }
    }

    /// Run one input file through the header/data state machine, appending its
    /// records to `out`.
    ///
    /// Header lines are copied verbatim until the first marker line of the
    /// run has been written; every later header region is consumed silently.
    /// Once the file's lines are exhausted the session offset advances to the
    /// last rewritten timestamp, or stays put when nothing parsed.
    pub fn merge_file<W: Write>(&mut self, fpath: &Path, out: &mut W) -> Result<usize> {
        let fin = File::open(fpath)?;
        let mut reader = BufReader::new(fin);

        let mut in_data = false;
        let mut last: Option<f64> = None;
        let mut records = 0;
        let mut raw = Vec::new();

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            // Best-effort decoding; malformed bytes never abort the merge
            let line = String::from_utf8_lossy(&raw);

            if !in_data {
                if !self.header_written {
                    out.write_all(line.as_bytes())?;
                }
                if self.is_marker(line.trim()) {
                    in_data = true;
                    self.header_written = true;
                }
                continue;
            }

            match self.dispatch(&line) {
                Outcome::Skip => {}
                Outcome::PassThrough => out.write_all(line.as_bytes())?,
                Outcome::Rewrite { line, timestamp } => {
                    out.write_all(line.as_bytes())?;
                    last = Some(timestamp);
                    records += 1;
                }
            }
        }

        if !in_data {
            warn!(
                "no {:?} marker in {:?}; file contributed no records",
                self.spec.marker,
                fpath.file_name().unwrap_or(fpath.as_os_str())
            );
        }
        if let Some(timestamp) = last {
            self.offset = timestamp;
        }

        Ok(records)
    }
}

/// Split a raw line into its first whitespace-delimited token and the
/// remainder after the following whitespace run, terminator included.
///
/// Returns None when the line holds fewer than two tokens.
fn split_record(line: &str) -> Option<(&str, &str)> {
    let start = line.find(|c: char| !c.is_whitespace())?;
    let after = &line[start..];
    let token_end = after.find(char::is_whitespace)?;
    let rest = after[token_end..].trim_start_matches(char::is_whitespace);
    if rest.is_empty() {
        return None;
    }

    Some((&after[..token_end], rest))
}

/// All entries of `dir` matching `extension`, sorted lexicographically by
/// full path. `exclude` (the merge output) is never a candidate.
pub fn find_inputs(dir: &Path, extension: &str, exclude: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputDir(dir.to_path_buf()));
    }

    let mut fpaths: Vec<PathBuf> = Vec::default();
    for entry in std::fs::read_dir(dir)? {
        let fpath = entry?.path();
        if fpath == exclude {
            continue;
        }
        if fpath.extension().and_then(|e| e.to_str()) == Some(extension) && fpath.is_file() {
            fpaths.push(fpath);
        }
    }
    fpaths.sort();

    Ok(fpaths)
}

/// Merge every matching file in `input_dir` into `output_path`, rewriting
/// timestamps for continuity.
///
/// The input set is collected before the output file is created, so an output
/// placed inside the input directory is never read back as input. Fails
/// without creating the output when the directory is missing or matches no
/// files.
pub fn merge(input_dir: &Path, output_path: &Path, spec: FormatSpec) -> Result<MergeSummary> {
    let inputs = find_inputs(input_dir, &spec.extension, output_path)?;
    if inputs.is_empty() {
        return Err(Error::NoInputs {
            dir: input_dir.to_path_buf(),
            extension: spec.extension,
        });
    }
    info!("found {} files, starting merge", inputs.len());

    let mut session = MergeSession::new(spec);
    let mut writer = BufWriter::new(File::create(output_path)?);
    let mut summary = MergeSummary::default();

    for fpath in &inputs {
        info!("processing {:?}", fpath.file_name().unwrap_or(fpath.as_os_str()));
        let records = session.merge_file(fpath, &mut writer)?;
        debug!("{records} records from {fpath:?}");
        summary.files += 1;
        summary.records += records;
    }
    writer.flush()?;

    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;

    fn session() -> MergeSession {
        MergeSession::new(FormatSpec::default())
    }

    #[test]
    fn test_split_record() {
        assert_eq!(split_record("0.001 1 ID1 Rx\n"), Some(("0.001", "1 ID1 Rx\n")));
        // leading indent and the whitespace run collapse, remainder is verbatim
        assert_eq!(split_record("   0.001   1  ID1\n"), Some(("0.001", "1  ID1\n")));
        assert_eq!(split_record("0.001\n"), None);
        assert_eq!(split_record("0.001   \n"), None);
        assert_eq!(split_record("\n"), None);
        assert_eq!(split_record(""), None);
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        let session = session();

        assert!(session.is_marker("base hex  timestamps absolute"));
        assert!(session.is_marker("Base HEX Timestamps"));
        assert!(session.is_marker("BASE HEX"));
        assert!(!session.is_marker("internal events logged"));
    }

    #[test]
    fn test_dispatch_rewrites_with_offset() {
        let mut session = session();
        session.offset = 1.5;

        match session.dispatch("0.250 1 ID2 Rx d 8\n") {
            Outcome::Rewrite { line, timestamp } => {
                assert_eq!(line, "1.750 1 ID2 Rx d 8\n");
                assert!((timestamp - 1.75).abs() < 1e-9);
            }
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_skips_non_records() {
        let session = session();

        assert_eq!(session.dispatch("\n"), Outcome::Skip);
        assert_eq!(session.dispatch("justonetoken\n"), Outcome::Skip);
        assert_eq!(session.dispatch("99\n"), Outcome::Skip);
        assert_eq!(session.dispatch("Begin TriggerBlock\n"), Outcome::Skip);
    }

    #[test]
    fn test_dispatch_passes_non_finite_through() {
        let session = session();

        assert_eq!(session.dispatch("inf 1 ID1 Rx\n"), Outcome::PassThrough);
        assert_eq!(session.dispatch("nan 1 ID1 Rx\n"), Outcome::PassThrough);
    }
}
