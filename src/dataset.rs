//! Instance dataset loading
//!
//! The dataset is an ordered CSV export of selected dialog instances, read
//! once at startup and shared read-only for the lifetime of the process.
//! Column names follow the export: `__index_level_0__` is the stable row
//! identifier and `text` holds the raw transcript blob.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// One dialog transcript record, never mutated after load
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    #[serde(rename = "__index_level_0__")]
    pub instance_id: i64,
    pub text: String,
}

/// Immutable ordered collection of instances
#[derive(Debug, Clone)]
pub struct Dataset {
    instances: Vec<Instance>,
}

impl Dataset {
    /// Load instances from a CSV file, optionally truncated to the first
    /// `limit` rows (deployments typically serve only the head of the
    /// export).
    pub fn load(path: &Path, limit: Option<usize>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        Self::from_reader(&mut reader, limit)
    }

    fn from_reader<R: Read>(reader: &mut csv::Reader<R>, limit: Option<usize>) -> Result<Self> {
        let mut instances = Vec::new();
        for record in reader.deserialize() {
            let instance: Instance = record?;
            instances.push(instance);
            if limit.is_some_and(|n| instances.len() >= n) {
                break;
            }
        }
        Ok(Self { instances })
    }

    pub fn from_instances(instances: Vec<Instance>) -> Self {
        Self { instances }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_from(csv_text: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(csv_text.as_bytes())
    }

    #[test]
    fn test_load_preserves_order_and_ids() {
        let csv_text = "__index_level_0__,text\n12,first transcript\n7,second transcript\n";
        let dataset = Dataset::from_reader(&mut reader_from(csv_text), None).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(0).unwrap().instance_id, 12);
        assert_eq!(dataset.get(1).unwrap().text, "second transcript");
        assert!(dataset.get(2).is_none());
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv_text = "__index_level_0__,text,score\n3,hello,0.5\n";
        let dataset = Dataset::from_reader(&mut reader_from(csv_text), None).unwrap();
        assert_eq!(dataset.get(0).unwrap().instance_id, 3);
    }

    #[test]
    fn test_limit_truncates_to_head() {
        let csv_text = "__index_level_0__,text\n0,a\n1,b\n2,c\n";
        let dataset = Dataset::from_reader(&mut reader_from(csv_text), Some(2)).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1).unwrap().text, "b");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv_text = "id,text\n0,a\n";
        assert!(Dataset::from_reader(&mut reader_from(csv_text), None).is_err());
    }
}
