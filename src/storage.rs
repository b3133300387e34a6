use csv::StringRecord;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::constants::{PROFILE_FIELD, ROSTER_FIELDS};
use crate::error::{Result, RosterError};
use crate::types::{Category, CyclistRecord, Price};

/// Layout options for the roster CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub include_header: bool,
    pub include_profile_url: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            include_profile_url: false,
        }
    }
}

impl From<&OutputConfig> for WriteOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            include_header: config.include_header,
            include_profile_url: config.include_profile_url,
        }
    }
}

/// Write records in the canonical column order
pub fn write_roster<W: Write>(writer: W, records: &[CyclistRecord], options: WriteOptions) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    if options.include_header {
        let mut header: Vec<&str> = ROSTER_FIELDS.to_vec();
        if options.include_profile_url {
            header.push(PROFILE_FIELD);
        }
        out.write_record(&header)?;
    }

    for record in records {
        let mut row = vec![
            record.first_name.clone(),
            record.last_name.clone(),
            record.team.clone(),
            record.nationality.clone(),
            record.age.map(|a| a.to_string()).unwrap_or_default(),
            record.uci_ranking.map(|r| r.to_string()).unwrap_or_default(),
            record.speciality.clone(),
            record.price.to_string(),
            record.category.as_str().to_string(),
        ];
        if options.include_profile_url {
            row.push(record.profile_path.clone().unwrap_or_default());
        }
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

/// Read a roster back. A first row whose first cell is `first_name` is
/// taken as the header.
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<CyclistRecord>> {
    let mut input = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, row) in input.records().enumerate() {
        let row = row?;
        if idx == 0 && is_header(&row) {
            continue;
        }
        records.push(parse_row(&row)?);
    }
    Ok(records)
}

fn is_header(row: &StringRecord) -> bool {
    row.get(0)
        .map(|cell| cell.trim_start_matches('\u{feff}'))
        .is_some_and(|cell| cell.eq_ignore_ascii_case(ROSTER_FIELDS[0]))
}

fn parse_row(row: &StringRecord) -> Result<CyclistRecord> {
    if row.len() < ROSTER_FIELDS.len() {
        return Err(RosterError::InvalidField {
            field: "row",
            value: row.iter().collect::<Vec<_>>().join(","),
        });
    }
    let text = |i: usize| row.get(i).unwrap_or_default().to_string();

    Ok(CyclistRecord {
        first_name: text(0),
        last_name: text(1),
        team: text(2),
        nationality: text(3),
        age: optional_number(row.get(4), "age")?,
        uci_ranking: optional_number(row.get(5), "uci_ranking")?,
        speciality: text(6),
        price: text(7).parse::<Price>()?,
        category: text(8).parse::<Category>()?,
        profile_path: row.get(9).filter(|p| !p.is_empty()).map(str::to_string),
    })
}

fn optional_number(cell: Option<&str>, field: &'static str) -> Result<Option<u32>> {
    match cell.filter(|c| !c.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| RosterError::InvalidField {
            field,
            value: value.to_string(),
        }),
    }
}

/// Persist the roster to `path`, creating parent directories as needed
pub fn save_roster(path: &Path, records: &[CyclistRecord], options: WriteOptions) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_roster(file, records, options)?;
    info!(path = %path.display(), records = records.len(), "Saved roster");
    Ok(())
}

pub fn load_roster(path: &Path) -> Result<Vec<CyclistRecord>> {
    let records = read_roster(File::open(path)?)?;
    debug!(path = %path.display(), records = records.len(), "Loaded roster");
    Ok(records)
}
