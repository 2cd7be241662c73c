//! Log file naming
//!
//! A session file is named `wm` + the last six decimal digits of the clock
//! at session start + `.txt`, e.g. `wm123456.txt`.

pub const FILE_PREFIX: &str = "wm";
pub const FILE_EXTENSION: &str = "txt";
pub const SUFFIX_DIGITS: usize = 6;

const SUFFIX_MODULUS: u64 = 1_000_000;

/// File name for a session starting at `now_ms`
pub fn session_file_name(now_ms: u64) -> String {
    format!(
        "{FILE_PREFIX}{:0width$}.{FILE_EXTENSION}",
        now_ms % SUFFIX_MODULUS,
        width = SUFFIX_DIGITS
    )
}

/// Numeric suffix of a session file name, or `None` for other files
pub fn parse_session_suffix(name: &str) -> Option<u32> {
    let digits = name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_EXTENSION)?
        .strip_suffix('.')?;
    if digits.len() != SUFFIX_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
