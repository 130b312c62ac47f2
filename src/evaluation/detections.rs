//! In-memory table of MOTChallenge detections, indexed by frame.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::InputFormatError;

/// Columns per row: `frame,id,bb_left,bb_top,bb_width,bb_height,conf,x,y,z`.
pub const DETECTION_FIELDS: usize = 10;

#[derive(Debug, Deserialize)]
struct DetectionRow {
    frame: f64,
    id: f64,
    bb_left: f64,
    bb_top: f64,
    bb_width: f64,
    bb_height: f64,
    conf: f64,
    x: f64,
    y: f64,
    z: f64,
}

/// One object proposal from the detection file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub frame: i64,
    /// Identity placeholder, -1 in detection files
    pub id: f64,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub conf: f64,
    /// World coordinates, carried through untouched
    pub world: [f64; 3],
    /// `left + width`
    pub right: f64,
    /// `top + height`
    pub bottom: f64,
}

impl Detection {
    /// Tracker input layout: (x1, y1, x2, y2, score).
    pub fn tlbr_score(&self) -> [f64; 5] {
        [
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.conf,
        ]
    }
}

/// Detections in file order with a frame index over them.
#[derive(Debug, Clone, Default)]
pub struct DetectionTable {
    rows: Vec<Detection>,
    by_frame: BTreeMap<i64, Vec<usize>>,
}

impl DetectionTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InputFormatError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| InputFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;

        info!(
            path = %path.display(),
            rows = table.len(),
            frames = table.by_frame.len(),
            "loaded detections"
        );
        Ok(table)
    }

    /// Read headerless comma-separated rows of exactly ten numeric fields.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InputFormatError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::default();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());

            if record.len() != DETECTION_FIELDS {
                return Err(InputFormatError::FieldCount {
                    line,
                    expected: DETECTION_FIELDS,
                    found: record.len(),
                });
            }

            let row: DetectionRow =
                record
                    .deserialize(None)
                    .map_err(|e| InputFormatError::InvalidField {
                        line,
                        reason: e.to_string(),
                    })?;
            table.push(row, line)?;
        }

        Ok(table)
    }

    fn push(&mut self, row: DetectionRow, line: u64) -> Result<(), InputFormatError> {
        if !row.frame.is_finite() || row.frame.fract() != 0.0 {
            return Err(InputFormatError::NonIntegralFrame {
                line,
                value: row.frame,
            });
        }
        let frame = row.frame as i64;

        self.by_frame.entry(frame).or_default().push(self.rows.len());
        self.rows.push(Detection {
            frame,
            id: row.id,
            left: row.bb_left,
            top: row.bb_top,
            width: row.bb_width,
            height: row.bb_height,
            conf: row.conf,
            world: [row.x, row.y, row.z],
            right: row.bb_left + row.bb_width,
            bottom: row.bb_top + row.bb_height,
        });
        Ok(())
    }

    /// Rows of `frame_id` in file order; empty when the frame has none.
    pub fn rows_for_frame(&self, frame_id: u32) -> Vec<&Detection> {
        self.by_frame
            .get(&i64::from(frame_id))
            .map(|indices| indices.iter().map(|&i| &self.rows[i]).collect())
            .unwrap_or_default()
    }

    /// All rows in file order.
    pub fn rows(&self) -> &[Detection] {
        &self.rows
    }

    /// Distinct frame numbers, ascending.
    pub fn frames(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_frame.keys().copied()
    }

    /// Number of rows whose frame lies outside `1..=seq_length`.
    pub fn rows_outside(&self, seq_length: u32) -> usize {
        self.by_frame
            .iter()
            .filter(|(frame, _)| !(1..=i64::from(seq_length)).contains(*frame))
            .map(|(_, rows)| rows.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
