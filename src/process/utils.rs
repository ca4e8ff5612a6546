/// Trim surrounding whitespace. Quoting is already undone by the csv reader,
/// so quote characters left in a cell are data.
pub fn clean_str(raw: &str) -> String {
    raw.trim().to_string()
}

/// Tokens read as a missing value rather than data.
const MISSING_TOKENS: &[&str] = &[
    "", "#n/a", "#n/a n/a", "#na", "-1.#ind", "-1.#qnan", "-nan", "1.#ind", "1.#qnan", "<na>",
    "n/a", "na", "nan", "none", "null",
];

/// Whether an already-cleaned cell counts as missing.
pub fn is_missing(cleaned: &str) -> bool {
    let lowered = cleaned.to_ascii_lowercase();
    MISSING_TOKENS.contains(&lowered.as_str())
}

/// Header text for column `idx`: trimmed, or `Unnamed: idx` when blank.
pub fn header_name(raw: &str, idx: usize) -> String {
    let name = clean_str(raw);
    if name.is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        name
    }
}
