//! Lenient deserializers for spreadsheet-derived columns.
//!
//! Imported columns come straight from Excel cells, so a bus number or a
//! trunk line can arrive as a JSON number instead of a string.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// `"2"` → `Some("2")`, `2` → `Some("2")`, `null` → `None`
///
/// # Errors
///
/// Returns an error if the value is an array or an object.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(cell.map(|c| match c {
        Cell::Text(s) => s,
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Bool(b) => b.to_string(),
    }))
}
