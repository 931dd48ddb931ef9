//! Fallback values the façade hands out when a run carries no data of its own.

/// File type reported for a file absent from the file info map.
pub const DEFAULT_FILE_TYPE: i64 = 999;

/// Tags reported for a file absent from the file info map.
pub const DEFAULT_FILE_TAGS: [&str; 3] = ["one", "two", "three"];

/// Total output size at which the report flags a warning (512 MiB).
pub const SIZE_WARNING_BYTES: u64 = 512 * 1024 * 1024;

/// Placeholder identity used when no parameter file supplies `user_data`.
pub mod user {
    pub const FIRST_NAME: &str = "John";
    pub const LAST_NAME: &str = "Testerson";
    pub const USER_ID: &str = "~johnt";
    pub const LOCALE: &str = "en-us";
}

/// Platform-side parameters a unit may query through the façade.
pub const SYSTEM_PARAMS: &[(&str, i64)] = &[("cost_per_email", 4), ("cost_per_user_id", 2)];

/// Look up a platform system parameter by name.
pub fn system_param(name: &str) -> Option<i64> {
    SYSTEM_PARAMS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}
