use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "WellWave";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the reference data directory.
pub const DATA_DIR_ENV: &str = "WELLWAVE_DATA_DIR";

/// Reference data file names (inside `reference_data_dir()`).
pub const RED_FLAG_RULES_FILE: &str = "red_flag_rules.json";
pub const SYMPTOM_MAPPINGS_FILE: &str = "symptom_mappings.json";
pub const COMPLAINT_CATALOG_FILE: &str = "complaints.json";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "wellwave=debug"
    } else {
        "wellwave=info"
    }
}

/// Get the reference data directory.
/// `$WELLWAVE_DATA_DIR` when set, `./data` otherwise.
pub fn reference_data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Path of the bundled complaint catalog.
pub fn complaint_catalog_path() -> PathBuf {
    reference_data_dir().join(COMPLAINT_CATALOG_FILE)
}
