use log::info;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::ProductRecord;
use crate::ScraperResult;

/// Output layout: `<base>/<id>.json` and `<base>/assets/<id>/`.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    base_path: PathBuf,
}

impl DiskStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> ScraperResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn record_path(&self, record: &ProductRecord) -> PathBuf {
        self.base_path.join(format!("{}.json", record.file_stem()))
    }

    pub fn asset_dir(&self, record: &ProductRecord) -> PathBuf {
        self.base_path.join("assets").join(record.file_stem())
    }

    /// Writes `record` as 4-space indented UTF-8 JSON, replacing any earlier copy.
    pub fn store(&self, record: &ProductRecord) -> ScraperResult<PathBuf> {
        let path = self.record_path(record);

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        record.serialize(&mut serializer)?;

        fs::write(&path, buf)?;
        info!("JSON file saved at: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BomLine, Nameplate};
    use serde_json::Value;

    fn record(id: &str, description: &str) -> ProductRecord {
        ProductRecord {
            product_id: id.to_string(),
            description: description.to_string(),
            specs: Nameplate::new(),
            bom: vec![BomLine {
                part_number: "WD1021A08".into(),
                description: "Shaft Key".into(),
                quantity: "1.000 EA".into(),
            }],
            image_url: String::new(),
            manual_url: String::new(),
            image_path: None,
            manual_path: None,
        }
    }

    #[test]
    fn test_store_names_file_after_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path().join("output")).unwrap();

        let path = storage.store(&record("CDP3310", "DC motor")).unwrap();

        assert_eq!(path, dir.path().join("output").join("CDP3310.json"));
        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["product_id"], "CDP3310");
        assert_eq!(saved["specs"], serde_json::json!({}));
        assert_eq!(saved["bom"][0]["part_number"], "WD1021A08");
    }

    #[test]
    fn test_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).unwrap();

        storage.store(&record("CDP3310", "first")).unwrap();
        let path = storage.store(&record("CDP3310", "second")).unwrap();

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let saved: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved["description"], "second");
    }

    #[test]
    fn test_json_uses_four_space_indent_and_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).unwrap();

        let path = storage.store(&record("CDP3310", "Moteur à courant continu")).unwrap();
        let text = fs::read_to_string(path).unwrap();

        assert!(text.contains("\n    \"product_id\": \"CDP3310\""));
        assert!(text.contains("Moteur à courant continu"));
    }

    #[test]
    fn test_json_and_assets_share_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).unwrap();
        let record = record("CD3433", "");

        let json = storage.record_path(&record);
        let assets = storage.asset_dir(&record);
        assert_eq!(json.file_stem(), assets.file_name());
        assert!(assets.ends_with(Path::new("assets").join("CD3433")));
    }
}
