use std::sync::OnceLock;

use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const UNIDENTIFIED: &str = "Unidentified";

/// Nameplate label/value pairs in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nameplate(Vec<(String, String)>);

impl Nameplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `label`, replacing the value in place if the label was seen before.
    pub fn insert(&mut self, label: String, value: String) {
        match self.0.iter_mut().find(|(existing, _)| *existing == label) {
            Some(entry) => entry.1 = value,
            None => self.0.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Nameplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BomLine {
    pub part_number: String,
    pub description: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub description: String,
    pub specs: Nameplate,
    pub bom: Vec<BomLine>,
    pub image_url: String,
    pub manual_url: String,
    pub image_path: Option<String>,
    pub manual_path: Option<String>,
}

impl ProductRecord {
    /// Base name shared by the JSON file and the asset directory.
    pub fn file_stem(&self) -> String {
        file_stem(&self.product_id)
    }
}

pub fn file_stem(product_id: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static pattern"));

    let trimmed = product_id.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return UNIDENTIFIED.to_string();
    }
    unsafe_chars.replace_all(trimmed, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> ProductRecord {
        let mut specs = Nameplate::new();
        specs.insert("volts".into(), "90".into());
        specs.insert("hp".into(), ".25".into());

        ProductRecord {
            product_id: "CDP3310".into(),
            description: ".25HP,1750RPM,DC,3312P,TEFC".into(),
            specs,
            bom: vec![BomLine {
                part_number: "WD1021A08".into(),
                description: "WD1021A08 Shaft Key".into(),
                quantity: "1.000 EA".into(),
            }],
            image_url: String::new(),
            manual_url: "https://example.com/pdf".into(),
            image_path: None,
            manual_path: Some("output/assets/CDP3310/manual.pdf".into()),
        }
    }

    #[test]
    fn test_nameplate_keeps_page_order() {
        let value = serde_json::to_string(&record().specs).unwrap();
        assert_eq!(value, r#"{"volts":"90","hp":".25"}"#);
    }

    #[test]
    fn test_nameplate_insert_replaces_existing() {
        let mut specs = Nameplate::new();
        specs.insert("rpm".into(), "1750".into());
        specs.insert("frame".into(), "3312P".into());
        specs.insert("rpm".into(), "1800".into());

        assert_eq!(specs.len(), 2);
        assert_eq!(specs.get("rpm"), Some("1800"));
        assert_eq!(specs.labels().collect::<Vec<_>>(), vec!["rpm", "frame"]);
    }

    #[test]
    fn test_record_json_shape() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["product_id"], json!("CDP3310"));
        assert_eq!(value["bom"][0]["quantity"], json!("1.000 EA"));
        assert_eq!(value["image_url"], json!(""));
        assert_eq!(value["image_path"], json!(null));
        assert!(value.get("specs").unwrap().is_object());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("CDP3310"), "CDP3310");
        assert_eq!(file_stem("  CD-3433.A  "), "CD-3433.A");
        assert_eq!(file_stem("ab/cd\\ef"), "ab_cd_ef");
        assert_eq!(file_stem(""), UNIDENTIFIED);
        assert_eq!(file_stem(".."), UNIDENTIFIED);
    }
}
