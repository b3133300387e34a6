use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, RosterError};
use crate::types::{Category, Price};

/// Authoritative data for a known rider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub name: String,
    pub team: String,
    pub nationality: String,
    pub ranking: u32,
    pub category: Category,
    pub price: Price,
}

/// `[[rider]]` table as written in a reference file. The price stays raw so
/// out-of-range values can be rejected instead of clamped.
#[derive(Debug, Deserialize)]
struct ReferenceRow {
    name: String,
    team: String,
    nationality: String,
    ranking: u32,
    category: Category,
    price: f64,
}

impl ReferenceRow {
    fn into_entry(self) -> Result<ReferenceEntry> {
        let price = Price::checked_from_f64(self.price).ok_or_else(|| {
            RosterError::Reference(format!(
                "price {} for '{}' is outside [{}, {}]",
                self.price,
                self.name,
                Price::MIN,
                Price::MAX
            ))
        })?;
        Ok(ReferenceEntry {
            name: self.name,
            team: self.team,
            nationality: self.nationality,
            ranking: self.ranking,
            category: self.category,
            price,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReferenceFile {
    #[serde(default, rename = "rider")]
    riders: Vec<ReferenceRow>,
}

/// How candidate names are compared to reference names
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Either name contains the other, case-insensitively
    #[default]
    Substring,
    /// Case-insensitive equality only
    Exact,
}

/// Ordered, read-only reference table. Order is significant: lookups return
/// the first entry that matches.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceEntry>) -> Result<Self> {
        // An empty name would be a substring of every candidate
        if let Some(pos) = entries.iter().position(|e| e.name.trim().is_empty()) {
            return Err(RosterError::Reference(format!(
                "entry {} has an empty name",
                pos + 1
            )));
        }
        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a TOML document made of `[[rider]]` tables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ReferenceFile = toml::from_str(content)?;
        let entries = file
            .riders
            .into_iter()
            .map(ReferenceRow::into_entry)
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RosterError::Reference(format!(
                "Failed to read reference table '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// The curated list of top riders shipped with the crate
    pub fn builtin() -> Self {
        let entries = BUILTIN_RIDERS
            .iter()
            .map(|&(name, team, nationality, ranking, category, price)| ReferenceEntry {
                name: name.to_string(),
                team: team.to_string(),
                nationality: nationality.to_string(),
                ranking,
                category,
                price: Price::from_f64(price),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEntry> {
        self.entries.iter()
    }
}

/// Looks candidates up in the reference table.
///
/// Resolution is first-match-wins in table order, not best match: with
/// substring matching a short entry such as "Yates" claims every rider whose
/// name contains it.
#[derive(Debug, Clone)]
pub struct ReferenceMatcher {
    table: ReferenceTable,
    mode: MatchMode,
}

impl ReferenceMatcher {
    pub fn new(table: ReferenceTable, mode: MatchMode) -> Self {
        Self { table, mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    pub fn lookup(&self, full_name: &str) -> Option<&ReferenceEntry> {
        let candidate = full_name.trim().to_lowercase();
        if candidate.is_empty() {
            return None;
        }

        let mut matches = self
            .table
            .iter()
            .filter(|entry| self.matches(&entry.name.to_lowercase(), &candidate));
        let first = matches.next()?;

        let others = matches.count();
        if others > 0 {
            debug!(
                candidate = %full_name,
                chosen = %first.name,
                others,
                "Ambiguous reference match resolved by table order"
            );
        }
        Some(first)
    }

    fn matches(&self, reference: &str, candidate: &str) -> bool {
        match self.mode {
            MatchMode::Substring => candidate.contains(reference) || reference.contains(candidate),
            MatchMode::Exact => candidate == reference,
        }
    }
}

type BuiltinRider = (&'static str, &'static str, &'static str, u32, Category, f64);

const BUILTIN_RIDERS: &[BuiltinRider] = &[
    ("Tadej Pogačar", "UAE Team Emirates-XRG", "Slovenia", 1, Category::Gc, 15.0),
    ("Jonas Vingegaard", "Team Visma-Lease a Bike", "Denmark", 2, Category::Gc, 14.0),
    ("Remco Evenepoel", "Soudal Quick-Step", "Belgium", 3, Category::Gc, 13.0),
    ("Primož Roglič", "Red Bull-BORA-hansgrohe", "Slovenia", 4, Category::Gc, 12.0),
    ("Jasper Philipsen", "Alpecin-Premier Tech", "Belgium", 7, Category::Sprinter, 11.0),
    ("Jonathan Milan", "Lidl-Trek", "Italy", 8, Category::Sprinter, 10.0),
    ("Biniam Girmay", "Lidl-Trek", "Eritrea", 9, Category::Sprinter, 10.0),
    ("Mads Pedersen", "Lidl-Trek", "Denmark", 10, Category::Classics, 10.0),
    ("João Almeida", "UAE Team Emirates-XRG", "Portugal", 11, Category::Gc, 10.0),
    ("Juan Ayuso", "UAE Team Emirates-XRG", "Spain", 12, Category::Gc, 10.0),
    ("Adam Yates", "UAE Team Emirates-XRG", "United Kingdom", 20, Category::Gc, 8.0),
    ("Matteo Jorgenson", "Team Visma-Lease a Bike", "USA", 13, Category::Gc, 9.5),
    ("Richard Carapaz", "EF Education-EasyPost", "Ecuador", 23, Category::Gc, 8.0),
    ("Ben Healy", "EF Education-EasyPost", "Ireland", 21, Category::Climber, 8.0),
    ("Tim Merlier", "Soudal Quick-Step", "Belgium", 15, Category::Sprinter, 9.0),
    ("Mikel Landa", "Soudal Quick-Step", "Spain", 33, Category::Climber, 7.0),
    ("Kasper Asgreen", "Soudal Quick-Step", "Denmark", 36, Category::Classics, 6.5),
    ("Enric Mas", "Movistar Team", "Spain", 29, Category::Gc, 7.5),
    ("Cian Uijtdebroeks", "Movistar Team", "Belgium", 31, Category::Gc, 7.0),
    ("Nelson Oliveira", "Movistar Team", "Portugal", 70, Category::Rouleur, 4.5),
    ("Rui Oliveira", "UAE Team Emirates-XRG", "Portugal", 80, Category::Rouleur, 4.0),
    ("Ivo Oliveira", "UAE Team Emirates-XRG", "Portugal", 85, Category::Rouleur, 4.0),
    ("Sepp Kuss", "Team Visma-Lease a Bike", "USA", 22, Category::Climber, 8.0),
    ("Christophe Laporte", "Team Visma-Lease a Bike", "France", 16, Category::Rouleur, 8.5),
    ("Wout van Aert", "Team Visma-Lease a Bike", "Belgium", 6, Category::Classics, 13.0),
    ("Mathieu van der Poel", "Alpecin-Premier Tech", "Netherlands", 5, Category::Classics, 14.0),
    ("Tom Pidcock", "INEOS Grenadiers", "United Kingdom", 17, Category::Classics, 9.0),
    ("Carlos Rodríguez", "INEOS Grenadiers", "Spain", 19, Category::Gc, 8.5),
    ("Egan Bernal", "INEOS Grenadiers", "Colombia", 35, Category::Gc, 7.0),
    ("Filippo Ganna", "INEOS Grenadiers", "Italy", 25, Category::Rouleur, 7.5),
    ("Santiago Buitrago", "Bahrain Victorious", "Colombia", 49, Category::Climber, 6.0),
    ("Antonio Tiberi", "Bahrain Victorious", "Italy", 48, Category::Gc, 6.0),
    ("Matej Mohorič", "Bahrain Victorious", "Slovenia", 51, Category::Classics, 5.5),
    ("Pello Bilbao", "Bahrain Victorious", "Spain", 32, Category::Climber, 7.0),
    ("David Gaudu", "Groupama-FDJ United", "France", 27, Category::Climber, 7.5),
    ("Romain Grégoire", "Groupama-FDJ United", "France", 24, Category::Rouleur, 7.5),
    ("Lenny Martinez", "Groupama-FDJ United", "France", 26, Category::Climber, 7.5),
    ("Giulio Ciccone", "Lidl-Trek", "Italy", 37, Category::Climber, 6.5),
    ("Jai Hindley", "Red Bull-BORA-hansgrohe", "Australia", 44, Category::Gc, 6.5),
    ("Aleksandr Vlasov", "Red Bull-BORA-hansgrohe", "Russia", 43, Category::Gc, 6.5),
    ("Jonas Abrahamsen", "Uno-X Mobility", "Norway", 45, Category::Rouleur, 6.0),
    ("Magnus Cort", "Uno-X Mobility", "Denmark", 47, Category::Sprinter, 6.0),
    ("Tobias Halland Johannessen", "Uno-X Mobility", "Norway", 46, Category::Climber, 6.0),
    ("Simon Yates", "Team Jayco-AlUla", "United Kingdom", 39, Category::Gc, 6.5),
    ("Michael Matthews", "Team Jayco-AlUla", "Australia", 41, Category::Sprinter, 6.0),
    ("Max Poole", "Team Picnic-PostNL", "United Kingdom", 55, Category::Climber, 5.5),
    ("Nairo Quintana", "Movistar Team", "Colombia", 50, Category::Climber, 6.0),
    ("Neilson Powless", "EF Education-EasyPost", "USA", 28, Category::Climber, 7.5),
    ("Jay Vine", "UAE Team Emirates-XRG", "Australia", 25, Category::Climber, 7.5),
    ("Marc Hirschi", "UAE Team Emirates-XRG", "Switzerland", 14, Category::Climber, 9.0),
    ("Olav Kooij", "Team Visma-Lease a Bike", "Netherlands", 18, Category::Sprinter, 8.5),
    ("Arnaud De Lie", "Lotto-Intermarché", "Belgium", 18, Category::Sprinter, 8.5),
    ("Julian Alaphilippe", "Soudal Quick-Step", "France", 34, Category::Classics, 7.0),
];
