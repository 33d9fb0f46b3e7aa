use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TimestampError {
    #[error("segment timestamp must be a non-negative number, got {0}")]
    Invalid(f64),
}

/// Formats seconds as `HH:MM:SS<sep>mmm`, all components zero-padded.
///
/// SRT uses `,` as the millisecond separator, VTT uses `.`. Negative or
/// non-finite input is a data-contract violation by the inference engine and
/// is reported, not clamped.
pub fn format_timestamp(seconds: f64, millis_sep: char) -> Result<String, TimestampError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TimestampError::Invalid(seconds));
    }

    let whole = seconds as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    // Guard against float rounding pushing the fraction to exactly 1000
    let millis = (((seconds - whole as f64) * 1000.0) as u64).min(999);

    Ok(format!(
        "{hours:02}:{minutes:02}:{secs:02}{millis_sep}{millis:03}"
    ))
}
