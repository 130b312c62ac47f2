//! MOTChallenge results file writer.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::OutputError;

/// One accepted track on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub frame: u32,
    pub track_id: u64,
    /// left, top, width, height
    pub tlwh: [f64; 4],
    pub score: f64,
}

/// `frame,track_id,left,top,width,height,score,-1,-1,-1` with the box and
/// score at two decimals.
impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [left, top, width, height] = self.tlwh;
        write!(
            f,
            "{},{},{:.2},{:.2},{:.2},{:.2},{:.2},-1,-1,-1",
            self.frame, self.track_id, left, top, width, height, self.score
        )
    }
}

/// Write `records` one per line to `destination`, creating missing parent
/// directories and replacing any existing file.
///
/// Without a destination nothing is written and `Ok(None)` is returned.
pub fn write_results(
    records: &[ResultRecord],
    destination: Option<&Path>,
) -> Result<Option<PathBuf>, OutputError> {
    let Some(path) = destination else {
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(write_err)?);
    for record in records {
        writeln!(writer, "{record}").map_err(write_err)?;
    }
    writer.flush().map_err(write_err)?;

    info!(path = %path.display(), records = records.len(), "saved tracking results");
    Ok(Some(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(frame: u32, track_id: u64) -> ResultRecord {
        ResultRecord {
            frame,
            track_id,
            tlwh: [10.0, 10.0, 50.0, 100.0],
            score: 0.9,
        }
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            record(1, 1).to_string(),
            "1,1,10.00,10.00,50.00,100.00,0.90,-1,-1,-1"
        );
        let odd = ResultRecord {
            frame: 12,
            track_id: 7,
            tlwh: [1.234, 5.678, 9.999, 0.5],
            score: 0.756,
        };
        assert_eq!(odd.to_string(), "12,7,1.23,5.68,10.00,0.50,0.76,-1,-1,-1");
    }

    #[test]
    fn test_creates_parent_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("seq.txt");

        let written = write_results(&[record(1, 1), record(2, 1)], Some(&path)).unwrap();
        assert_eq!(written.as_deref(), Some(path.as_path()));
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.ends_with("-1,-1,-1\n"));

        write_results(&[record(3, 2)], Some(&path)).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "3,2,10.00,10.00,50.00,100.00,0.90,-1,-1,-1\n");
    }

    #[test]
    fn test_empty_records_truncate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seq.txt");
        fs::write(&path, "stale\n").unwrap();
        write_results(&[], Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_no_destination_is_noop() {
        assert_eq!(write_results(&[record(1, 1)], None).unwrap(), None);
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let err = write_results(&[record(1, 1)], Some(&blocker.join("out.txt"))).unwrap_err();
        assert!(matches!(err, OutputError::Write { .. } | OutputError::CreateDir { .. }));
    }
}
