/// Parse a strictly positive number of seconds.
///
/// A zero budget would time out before the browser starts, so it is
/// rejected at parse time.
///
/// # Errors
///
/// Returns an error message if the value is not a positive integer.
pub fn parse_secs(s: &str) -> Result<u64, String> {
    let secs: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("expected a whole number of seconds, got '{s}'"))?;
    if secs == 0 {
        return Err("must be at least 1 second".to_string());
    }
    Ok(secs)
}

/// Parse a number of milliseconds. Zero is allowed (it disables the
/// corresponding window).
///
/// # Errors
///
/// Returns an error message if the value is not a non-negative integer.
pub fn parse_millis(s: &str) -> Result<u64, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("expected a whole number of milliseconds, got '{s}'"))
}
