//! Named, saved deal scenarios.
//!
//! The engine never touches storage itself; callers hand it whatever
//! [`ScenarioRepository`] suits them. Two are provided: an in-memory map and
//! a single JSON file keyed by scenario name.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CalcError;
use crate::inputs::DealInputs;
use crate::CalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A deal saved under a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub inputs: DealInputs,
    pub saved_at: DateTime<Utc>,
}

/// Storage for named scenarios. Saving an existing name overwrites it.
pub trait ScenarioRepository {
    fn save(&mut self, name: &str, inputs: &DealInputs) -> CalcResult<Scenario>;

    /// All scenarios, ordered by name.
    fn load_all(&self) -> CalcResult<Vec<Scenario>>;

    /// Remove a scenario. Returns whether it existed.
    fn delete(&mut self, name: &str) -> CalcResult<bool>;

    fn load(&self, name: &str) -> CalcResult<Option<Scenario>> {
        let name = name.trim();
        Ok(self.load_all()?.into_iter().find(|s| s.name == name))
    }
}

fn validate_name(name: &str) -> CalcResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CalcError::InvalidInput {
            field: "name".into(),
            reason: "Scenario name must not be blank".into(),
        });
    }
    Ok(name)
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InMemoryScenarioRepository {
    scenarios: BTreeMap<String, Scenario>,
}

impl InMemoryScenarioRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScenarioRepository for InMemoryScenarioRepository {
    fn save(&mut self, name: &str, inputs: &DealInputs) -> CalcResult<Scenario> {
        let name = validate_name(name)?;
        let scenario = Scenario {
            name: name.to_string(),
            inputs: inputs.clone(),
            saved_at: Utc::now(),
        };
        self.scenarios.insert(name.to_string(), scenario.clone());
        Ok(scenario)
    }

    fn load_all(&self) -> CalcResult<Vec<Scenario>> {
        Ok(self.scenarios.values().cloned().collect())
    }

    fn delete(&mut self, name: &str) -> CalcResult<bool> {
        Ok(self.scenarios.remove(name.trim()).is_some())
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// On-disk entry as written. Entries are read back as raw JSON so one bad
/// field cannot sink the file.
#[derive(Debug, Serialize)]
struct StoredScenario<'a> {
    inputs: &'a DealInputs,
    saved_at: DateTime<Utc>,
}

/// All scenarios in one JSON object keyed by name, rewritten atomically on
/// every change.
///
/// Reads fail soft, writes do not: `load_all` treats an unreadable file as
/// empty, while `save` and `delete` refuse to rewrite it so that no saved
/// scenario is lost.
#[derive(Debug, Clone)]
pub struct JsonFileScenarioRepository {
    path: PathBuf,
}

impl JsonFileScenarioRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw map. A missing file is empty.
    fn read_entries(&self) -> CalcResult<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(&self.path).map_err(|e| {
            CalcError::Storage(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            CalcError::Storage(format!(
                "Scenario file {} is unreadable: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, Value>) -> CalcResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CalcError::Storage(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)
            .map_err(|e| CalcError::Storage(format!("Failed to create temp file: {}", e)))?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, entries)?;
        writer
            .flush()
            .map_err(|e| CalcError::Storage(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| CalcError::Storage(format!("Failed to sync data: {}", e)))?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            CalcError::Storage(format!("Failed to rename temp file: {}", e))
        })?;

        Ok(())
    }
}

/// Decode one stored entry leniently: bad inputs fall back to the defaults
/// field by field and a bad timestamp becomes the epoch.
fn decode_entry(name: String, entry: &Value, defaults: &DealInputs) -> Scenario {
    let inputs = entry.get("inputs").unwrap_or(&Value::Null);
    let saved_at = entry
        .get("saved_at")
        .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v.clone()).ok())
        .unwrap_or_default();

    Scenario {
        inputs: DealInputs::from_value_lenient(inputs, defaults),
        saved_at,
        name,
    }
}

impl ScenarioRepository for JsonFileScenarioRepository {
    fn save(&mut self, name: &str, inputs: &DealInputs) -> CalcResult<Scenario> {
        let name = validate_name(name)?;
        let saved_at = Utc::now();

        let mut entries = self.read_entries()?;
        entries.insert(
            name.to_string(),
            serde_json::to_value(StoredScenario { inputs, saved_at })?,
        );
        self.write_entries(&entries)?;

        tracing::info!(scenario = name, path = %self.path.display(), "scenario saved");

        Ok(Scenario {
            name: name.to_string(),
            inputs: inputs.clone(),
            saved_at,
        })
    }

    fn load_all(&self) -> CalcResult<Vec<Scenario>> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "starting with no saved scenarios");
                BTreeMap::new()
            }
        };

        let defaults = DealInputs::default();
        Ok(entries
            .into_iter()
            .map(|(name, entry)| decode_entry(name, &entry, &defaults))
            .collect())
    }

    fn delete(&mut self, name: &str) -> CalcResult<bool> {
        let mut entries = self.read_entries()?;
        let existed = entries.remove(name.trim()).is_some();
        if existed {
            self.write_entries(&entries)?;
            tracing::info!(scenario = name.trim(), "scenario deleted");
        }
        Ok(existed)
    }
}
