//! Nearest-name lookup against a table of named LAB colors.
//!
//! Tables are JSON objects mapping a name to `[L, a, b]`. Entry order is
//! kept as written, since it decides ties.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use lazy_static::lazy_static;
use palette::Lab;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use tracing::debug;

use crate::convert::lab_distance;
use crate::error::{PaletteError, Result};

/// CSS color names with their D65 LAB coordinates.
const BUILTIN_COLORS: &str = include_str!("../data/lab_colors.json");

lazy_static! {
    static ref BUILTIN: std::result::Result<ReferenceTable, String> =
        ReferenceTable::from_json(BUILTIN_COLORS).map_err(|e| e.to_string());
}

/// Read-only name -> LAB table. Never empty.
#[derive(Clone, Debug)]
pub struct ReferenceTable {
    entries: Vec<(String, Lab)>,
}

impl ReferenceTable {
    /// Build a table from `(name, lab)` pairs, keeping their order.
    pub fn new(entries: Vec<(String, Lab)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(PaletteError::config("reference color table is empty"));
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for (name, _) in &entries {
            if !seen.insert(name.as_str()) {
                return Err(PaletteError::config(format!("duplicate color name `{name}`")));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let Entries(raw) = serde_json::from_str(json)
            .map_err(|e| PaletteError::config(format!("invalid color table: {e}")))?;
        let entries = raw
            .into_iter()
            .map(|(name, [l, a, b])| (name, Lab::new(l, a, b)))
            .collect();
        Self::new(entries)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PaletteError::config(format!("cannot read color table {}: {e}", path.display()))
        })?;
        let table = Self::from_json(&json)?;
        debug!(path = %path.display(), entries = table.len(), "loaded color table");
        Ok(table)
    }

    /// The table shipped with the crate, parsed once per process.
    pub fn builtin() -> Result<&'static ReferenceTable> {
        BUILTIN.as_ref().map_err(|e| PaletteError::config(e.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Lab)> {
        self.entries.iter().map(|(name, lab)| (name.as_str(), lab))
    }

    /// Closest entry to `lab` and its distance; the first of equal entries wins.
    pub fn nearest(&self, lab: &Lab) -> (&str, f32) {
        let mut best = (self.entries[0].0.as_str(), lab_distance(lab, &self.entries[0].1));
        for (name, candidate) in &self.entries[1..] {
            let dist = lab_distance(lab, candidate);
            if dist < best.1 {
                best = (name.as_str(), dist);
            }
        }
        best
    }

    pub fn name_color(&self, lab: &Lab) -> &str {
        self.nearest(lab).0
    }
}

/// Name `lab` with the built-in table.
pub fn name_color(lab: &Lab) -> Result<&'static str> {
    Ok(ReferenceTable::builtin()?.name_color(lab))
}

/// Map entries in document order.
struct Entries(Vec<(String, [f32; 3])>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of color names to [L, a, b] arrays")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Entries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, [f32; 3]>()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_BLUE: &str = r#"{"red": [53, 80, 67], "blue": [32, 79, -108]}"#;

    #[test]
    fn names_exact_and_nearby_colors() {
        let table = ReferenceTable::from_json(RED_BLUE).unwrap();
        assert_eq!(table.name_color(&Lab::new(53.0, 80.0, 67.0)), "red");
        assert_eq!(table.name_color(&Lab::new(35.0, 70.0, -90.0)), "blue");
    }

    #[test]
    fn ties_go_to_the_first_entry() {
        let table = ReferenceTable::from_json(r#"{"b": [10, 0, 0], "a": [-10, 0, 0]}"#).unwrap();
        assert_eq!(table.name_color(&Lab::new(0.0, 0.0, 0.0)), "b");
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn empty_table_is_a_config_error() {
        assert!(matches!(ReferenceTable::from_json("{}"), Err(PaletteError::Config(_))));
        assert!(matches!(ReferenceTable::new(Vec::new()), Err(PaletteError::Config(_))));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        for json in [
            r#"{"red": [53, 80]}"#,
            r#"{"red": [53, 80, 67, 1]}"#,
            r#"{"red": ["53", 80, 67]}"#,
            r#"["red"]"#,
            r#"{"red": [1, 2, 3], "red": [4, 5, 6]}"#,
        ] {
            assert!(
                matches!(ReferenceTable::from_json(json), Err(PaletteError::Config(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn missing_table_file_is_a_config_error() {
        assert!(matches!(
            ReferenceTable::from_path("no/such/colors.json"),
            Err(PaletteError::Config(_))
        ));
    }

    #[test]
    fn builtin_table_names_primaries() {
        let table = ReferenceTable::builtin().unwrap();
        assert!(table.len() > 100);
        assert_eq!(name_color(&Lab::new(53.24, 80.09, 67.2)).unwrap(), "red");
        assert_eq!(name_color(&Lab::new(32.3, 79.19, -107.86)).unwrap(), "blue");
        assert_eq!(name_color(&Lab::new(100.0, 0.0, 0.0)).unwrap(), "white");
        assert_eq!(name_color(&Lab::new(0.0, 0.0, 0.0)).unwrap(), "black");
    }
}
