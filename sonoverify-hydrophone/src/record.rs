use std::{collections::BTreeMap, fmt, fs::File, io::Read, path::Path, str::FromStr};

use getset::Getters;

use crate::error::CalibrationError;

/// The column holding the calibration frequencies in \[MHz\].
pub const FREQUENCY_COLUMN: &str = "FREQ_MHz";
/// The column holding the linear sensitivity in \[V/Pa\].
pub const SENSITIVITY_COLUMN: &str = "SENS_VPERPA";
/// The column holding the sensitivity in \[dB re 1 V/µPa\].
pub const SENSITIVITY_DB_COLUMN: &str = "SENS_DB";

const DATA_FIELDS: &str = "DATA_FIELDS";
const DATA_FIELD: &str = "DATA_FIELD";
const HEADER_END: &str = "HEADER_END";

/// Calibration frequencies closer than this in \[Hz\] are duplicates.
const FREQUENCY_RESOLUTION_HZ: f64 = 1e-3;

/// A metadata value of a calibration record.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// A value that parses as a finite number.
    Number(f64),
    /// Any other value, verbatim.
    Text(String),
}

impl MetadataValue {
    fn parse(value: &str) -> Self {
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Number(v),
            _ => Self::Text(value.to_owned()),
        }
    }

    /// Returns the number, if the value is numeric.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Returns the text, if the value is not numeric.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// The range of calibrated frequencies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    /// The lowest calibrated frequency in \[Hz\].
    pub min_hz: f64,
    /// The highest calibrated frequency in \[Hz\].
    pub max_hz: f64,
    /// The number of calibration points.
    pub n_points: usize,
}

/// The well-known metadata of a calibration record under readable names.
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub struct MetadataSummary {
    pub calibration_date: Option<MetadataValue>,
    pub manufacturer: Option<MetadataValue>,
    pub model: Option<MetadataValue>,
    pub aperture_um: Option<MetadataValue>,
    pub serial_number: Option<MetadataValue>,
    pub polarity: Option<MetadataValue>,
    pub water_temperature_degc: Option<MetadataValue>,
    pub water_resistivity_mohms_cm: Option<MetadataValue>,
    pub frequency_range: Option<FrequencyRange>,
}

/// A parsed hydrophone calibration record.
///
/// # File format
///
/// ```text
/// # comment
/// HYD_MODEL	HNR-0500
/// DATA_FIELDS	3
/// DATA_FIELD	FREQ_MHz
/// DATA_FIELD	SENS_DB
/// DATA_FIELD	SENS_VPERPA
/// HEADER_END
/// 1.0	-264.0	6.3e-8
/// ```
///
/// Blank lines and lines starting with `#` are ignored everywhere. Header lines are
/// `KEY<TAB>VALUE` pairs; after `HEADER_END` each line holds exactly one number per
/// declared field. Rows are sorted by frequency.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct CalibrationRecord {
    /// The header metadata, excluding the field declarations.
    #[getset(get = "pub")]
    metadata: BTreeMap<String, MetadataValue>,
    /// The declared column names, in file order.
    #[getset(get = "pub")]
    fields: Vec<String>,
    rows: Vec<Vec<f64>>,
    freq_idx: usize,
}

struct Header {
    metadata: BTreeMap<String, MetadataValue>,
    declared: Option<usize>,
    fields: Vec<String>,
}

impl Header {
    fn new() -> Self {
        Self {
            metadata: BTreeMap::new(),
            declared: None,
            fields: Vec::new(),
        }
    }

    fn push(&mut self, line_no: usize, line: &str) -> Result<(), CalibrationError> {
        let (key, value) = line
            .split_once('\t')
            .or_else(|| line.split_once(char::is_whitespace))
            .map_or((line, ""), |(k, v)| (k.trim(), v.trim()));
        match key {
            DATA_FIELDS => {
                let n = value.parse::<usize>().map_err(|_| {
                    CalibrationError::format(
                        line_no,
                        format!("{DATA_FIELDS} must be a non-negative integer, got {value:?}"),
                    )
                })?;
                self.declared = Some(n);
            }
            DATA_FIELD => {
                if value.is_empty() {
                    return Err(CalibrationError::format(
                        line_no,
                        format!("{DATA_FIELD} without a name"),
                    ));
                }
                self.fields.push(value.to_owned());
            }
            _ => {
                self.metadata
                    .insert(key.to_owned(), MetadataValue::parse(value));
            }
        }
        Ok(())
    }

    fn validate(&self, line_no: usize) -> Result<(usize, usize), CalibrationError> {
        let declared = self.declared.ok_or_else(|| {
            CalibrationError::format(line_no, format!("{DATA_FIELDS} is not declared"))
        })?;
        if declared != self.fields.len() {
            return Err(CalibrationError::format(
                line_no,
                format!(
                    "{DATA_FIELDS} declares {declared} fields, but {} {DATA_FIELD} lines were found",
                    self.fields.len()
                ),
            ));
        }
        let freq_idx = self
            .fields
            .iter()
            .position(|f| f == FREQUENCY_COLUMN)
            .ok_or_else(|| {
                CalibrationError::format(line_no, format!("{FREQUENCY_COLUMN} is not declared"))
            })?;
        if !self
            .fields
            .iter()
            .any(|f| f == SENSITIVITY_COLUMN || f == SENSITIVITY_DB_COLUMN)
        {
            return Err(CalibrationError::format(
                line_no,
                format!(
                    "Neither {SENSITIVITY_COLUMN} nor {SENSITIVITY_DB_COLUMN} is declared"
                ),
            ));
        }
        Ok((declared, freq_idx))
    }
}

fn parse_row(line_no: usize, line: &str, n: usize) -> Result<Vec<f64>, CalibrationError> {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    if tokens.len() != n {
        return Err(CalibrationError::format(
            line_no,
            format!("Expected {n} values, found {}", tokens.len()),
        ));
    }
    tokens
        .into_iter()
        .map(|t| match t.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(CalibrationError::format(
                line_no,
                format!("{t:?} is not a finite number"),
            )),
        })
        .collect()
}

impl FromStr for CalibrationRecord {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut header = Header::new();
        let mut layout = None;
        let mut rows = Vec::new();

        for (i, line) in s.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match layout {
                None if line.split_whitespace().next() == Some(HEADER_END) => {
                    layout = Some(header.validate(line_no)?);
                }
                None => header.push(line_no, line)?,
                Some((n, _)) => rows.push((line_no, parse_row(line_no, line, n)?)),
            }
        }

        let (_, freq_idx) =
            layout.ok_or_else(|| CalibrationError::format(0, format!("{HEADER_END} not found")))?;
        if rows.is_empty() {
            return Err(CalibrationError::format(0, "Calibration table is empty"));
        }

        rows.sort_by(|(_, a), (_, b)| a[freq_idx].total_cmp(&b[freq_idx]));
        if let Some((line_no, row)) = rows
            .windows(2)
            .find(|w| {
                w[1].1[freq_idx] * 1e6 - w[0].1[freq_idx] * 1e6 < FREQUENCY_RESOLUTION_HZ
            })
            .map(|w| &w[1])
        {
            return Err(CalibrationError::format(
                *line_no,
                format!("Duplicate frequency {} MHz", row[freq_idx]),
            ));
        }

        tracing::debug!(
            "Parsed calibration record: {} fields, {} rows",
            header.fields.len(),
            rows.len()
        );

        Ok(Self {
            metadata: header.metadata,
            fields: header.fields,
            rows: rows.into_iter().map(|(_, r)| r).collect(),
            freq_idx,
        })
    }
}

impl CalibrationRecord {
    /// Loads a calibration record from a file.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        Self::from_reader(File::open(path)?)
    }

    /// Reads a calibration record from `reader`.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, CalibrationError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        buf.parse()
    }

    /// Returns the metadata value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    /// The table rows, sorted by ascending frequency.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Returns the values of the column `name`, in row order.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.fields.iter().position(|f| f == name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// The calibrated frequencies in \[Hz\], ascending.
    #[must_use]
    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r[self.freq_idx] * 1e6).collect()
    }

    /// The range of calibrated frequencies.
    #[must_use]
    pub fn frequency_range(&self) -> FrequencyRange {
        let first = self.rows.first().map_or(f64::NAN, |r| r[self.freq_idx]);
        let last = self.rows.last().map_or(f64::NAN, |r| r[self.freq_idx]);
        FrequencyRange {
            min_hz: first * 1e6,
            max_hz: last * 1e6,
            n_points: self.rows.len(),
        }
    }

    /// Returns the well-known metadata under readable names.
    #[must_use]
    pub fn summary(&self) -> MetadataSummary {
        let get = |key: &str| self.metadata.get(key).cloned();
        MetadataSummary {
            calibration_date: get("Calibration_DATE"),
            manufacturer: get("HYD_MFG"),
            model: get("HYD_MODEL"),
            aperture_um: get("HYD_APERTURE_NOM_UM"),
            serial_number: get("HYD_SN"),
            polarity: get("HYD_POLARITY"),
            water_temperature_degc: get("WATER_TEMP_DEGC"),
            water_resistivity_mohms_cm: get("WATER_RESISTIVITY_MOHMS-CM"),
            frequency_range: Some(self.frequency_range()),
        }
    }
}
