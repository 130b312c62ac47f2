//! MOTChallenge `seqinfo.ini` parsing.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::ConfigError;
use crate::evaluation::ImageSize;

/// Section holding the sequence metadata.
pub const SEQUENCE_SECTION: &str = "Sequence";

/// Metadata of one video sequence.
///
/// Read from files in the format:
/// ```ini
/// [Sequence]
/// name=MOT20-01
/// imDir=img1
/// frameRate=25
/// seqLength=429
/// imWidth=1920
/// imHeight=1080
/// imExt=.jpg
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceMeta {
    pub name: Option<String>,
    pub frame_rate: f64,
    pub im_height: u32,
    pub im_width: u32,
    pub seq_length: u32,
}

impl SequenceMeta {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let meta = Self::parse(&text, &path.display().to_string())?;

        info!(
            name = meta.name.as_deref().unwrap_or("<unnamed>"),
            frame_rate = meta.frame_rate,
            height = meta.im_height,
            width = meta.im_width,
            frames = meta.seq_length,
            "loaded sequence info"
        );
        Ok(meta)
    }

    /// Parse INI text; `origin` only names the source in error messages.
    pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let sections = parse_ini(text, origin)?;
        let section = sections
            .get(SEQUENCE_SECTION)
            .ok_or_else(|| ConfigError::MissingSection {
                section: SEQUENCE_SECTION.to_string(),
                origin: origin.to_string(),
            })?;

        let lookup = |key: &str| -> Result<String, ConfigError> {
            section
                .get(&key.to_ascii_lowercase())
                .cloned()
                .ok_or_else(|| ConfigError::MissingKey {
                    key: key.to_string(),
                    section: SEQUENCE_SECTION.to_string(),
                    origin: origin.to_string(),
                })
        };

        let frame_rate: f64 = parse_value("frameRate", &lookup("frameRate")?)?;
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(invalid("frameRate", &frame_rate.to_string(), "must be a positive number"));
        }

        Ok(Self {
            name: section.get("name").cloned(),
            frame_rate,
            im_height: positive_int("imHeight", &lookup("imHeight")?)?,
            im_width: positive_int("imWidth", &lookup("imWidth")?)?,
            seq_length: positive_int("seqLength", &lookup("seqLength")?)?,
        })
    }

    pub fn image_size(&self) -> ImageSize {
        ImageSize::new(self.im_height, self.im_width)
    }
}

type Section = HashMap<String, String>;

/// Section names are case sensitive, keys are not.
fn parse_ini(text: &str, origin: &str) -> Result<HashMap<String, Section>, ConfigError> {
    let mut sections: HashMap<String, Section> = HashMap::new();
    let mut current: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let syntax = || ConfigError::Syntax {
            line: idx + 1,
            origin: origin.to_string(),
        };
        let split = line.find(['=', ':']).ok_or_else(syntax)?;
        let section = current.as_ref().ok_or_else(syntax)?;
        let key = line[..split].trim().to_ascii_lowercase();
        let value = line[split + 1..].trim().to_string();
        if key.is_empty() {
            return Err(syntax());
        }
        sections.entry(section.clone()).or_default().insert(key, value);
    }

    Ok(sections)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| invalid(key, value, &e.to_string()))
}

fn positive_int(key: &str, value: &str) -> Result<u32, ConfigError> {
    let parsed: u32 = parse_value(key, value)?;
    if parsed == 0 {
        return Err(invalid(key, value, "must be a positive integer"));
    }
    Ok(parsed)
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
