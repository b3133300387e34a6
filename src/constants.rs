//! Shared names and defaults used across the pipeline, storage and CLI

/// Canonical roster columns, in the fixed wire order
pub const ROSTER_FIELDS: [&str; 9] = [
    "first_name",
    "last_name",
    "team",
    "nationality",
    "age",
    "uci_ranking",
    "speciality",
    "price",
    "category",
];

/// Optional trailing column carrying the rider's profile path
pub const PROFILE_FIELD: &str = "profile_url";

/// Encodings tried in order when a scraped file is not valid UTF-8
pub const DEFAULT_ENCODINGS: [&str; 4] = ["utf-8", "utf-8-sig", "windows-1252", "iso-8859-1"];

/// Environment variable naming the config file when `--config` is absent
pub const CONFIG_ENV_VAR: &str = "CYCLIST_ROSTER_CONFIG";

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_OUTPUT_FILE: &str = "cyclists_enriched.csv";

/// Prefix of rider profile paths on the statistics service
pub const PROFILE_PREFIX: &str = "rider/";
pub const PROFILE_HOST: &str = "procyclingstats.com/";
