use anyhow::{bail, Result};
use chrono::NaiveDateTime;

/// `YYYY-MM-DD-HHMMSS`
const LABEL_FORMAT: &str = "%Y-%m-%d-%H%M%S";
const LABEL_LEN: usize = 17;

/// Positions of the dashes inside a label timestamp; every other byte is a digit.
const DASHES: [usize; 3] = [4, 7, 10];

/// Parse the capture time embedded in a snapshot label, e.g.
/// `starlink-2021-03-14-153012` or `2021-03-14-153012.json`.
pub fn parse_label(label: &str) -> Result<NaiveDateTime> {
    let bytes = label.as_bytes();

    for start in 0..bytes.len().saturating_sub(LABEL_LEN - 1) {
        let window = &bytes[start..start + LABEL_LEN];
        if !looks_like_timestamp(window) {
            continue;
        }
        // The window is ASCII, so slicing the str here is on char boundaries.
        let text = &label[start..start + LABEL_LEN];
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, LABEL_FORMAT) {
            return Ok(ts);
        }
    }

    bail!("No timestamp in label: {}", label)
}

fn looks_like_timestamp(window: &[u8]) -> bool {
    window.iter().enumerate().all(|(i, b)| {
        if DASHES.contains(&i) {
            *b == b'-'
        } else {
            b.is_ascii_digit()
        }
    })
}
