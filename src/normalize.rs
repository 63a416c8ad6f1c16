use calamine::Data;
use unicode_normalization::UnicodeNormalization;

/// Canonical matching key: accent-stripped, lowercased, single-spaced.
/// Applied on both sides of every fuzzy comparison in the pipeline.
pub fn normalize(text: &str) -> String {
    let ascii: String = text.nfd().filter(|c| c.is_ascii()).collect();
    ascii
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Total conversion of a spreadsheet cell to trimmed display text.
/// Empty and error cells become "", date cells render as YYYY-MM-DD, and
/// whole-number floats drop the fractional part so numeric registration ids
/// read back as "123" rather than "123.0".
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => float_text(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    }
}

pub fn normalize_cell(cell: &Data) -> String {
    normalize(&cell_text(cell))
}

fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Sheet names double as display labels: underscores expand to spaces and
/// each word is capitalized ("oficina_de_musica" -> "Oficina De Musica").
pub fn title_case(text: &str) -> String {
    text.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sheet-name key used for school lookups: normalized, spaces as underscores.
pub fn underscore_key(text: &str) -> String {
    normalize(text).replace(' ', "_")
}

/// Collapse internal whitespace without touching case or accents. Used for
/// free-text fields that are displayed verbatim but arrive messy.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
