//! Saved simulations: named snapshots of a projected summary statement.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::BizPlanError;
use crate::statement::SummaryPeriodRecord;
use crate::BizPlanResult;

/// Document key the whole collection is stored under.
pub const STORE_KEY: &str = "savedSimulations";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSimulation {
    pub id: String,
    pub name: String,
    pub data: Vec<SummaryPeriodRecord>,
    pub created_at: DateTime<Utc>,
}

/// Trimmed, non-empty simulation name.
pub fn validate_name(name: &str) -> BizPlanResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BizPlanError::InvalidInput {
            field: "name".into(),
            reason: "Simulation name must not be empty".into(),
        });
    }
    Ok(trimmed.to_string())
}

/// `sim-<millis>` for `now`, moved forward a millisecond at a time until it is
/// not already taken.
pub fn next_id(now: DateTime<Utc>, existing: &[SavedSimulation]) -> String {
    let mut at = now;
    loop {
        let id = format!("sim-{}", at.timestamp_millis());
        if !existing.iter().any(|s| s.id == id) {
            return id;
        }
        at += Duration::milliseconds(1);
    }
}

fn new_simulation(name: &str, data: Vec<SummaryPeriodRecord>, existing: &[SavedSimulation]) -> BizPlanResult<SavedSimulation> {
    let name = validate_name(name)?;
    let now = Utc::now();
    Ok(SavedSimulation {
        id: next_id(now, existing),
        name,
        data,
        created_at: now,
    })
}

pub trait SimulationStore {
    /// Every saved simulation, oldest first.
    fn list(&self) -> BizPlanResult<Vec<SavedSimulation>>;

    /// Validate `name`, append a new simulation and return it.
    fn save(&mut self, name: &str, data: Vec<SummaryPeriodRecord>) -> BizPlanResult<SavedSimulation>;

    fn delete(&mut self, id: &str) -> BizPlanResult<()>;

    /// Look up several simulations, preserving the order of `ids`.
    fn select(&self, ids: &[String]) -> BizPlanResult<Vec<SavedSimulation>> {
        let all = self.list()?;
        ids.iter()
            .map(|id| {
                all.iter()
                    .find(|s| &s.id == id)
                    .cloned()
                    .ok_or_else(|| BizPlanError::NotFound(format!("simulation '{id}'")))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    simulations: Vec<SavedSimulation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimulationStore for MemoryStore {
    fn list(&self) -> BizPlanResult<Vec<SavedSimulation>> {
        Ok(self.simulations.clone())
    }

    fn save(&mut self, name: &str, data: Vec<SummaryPeriodRecord>) -> BizPlanResult<SavedSimulation> {
        let sim = new_simulation(name, data, &self.simulations)?;
        self.simulations.push(sim.clone());
        Ok(sim)
    }

    fn delete(&mut self, id: &str) -> BizPlanResult<()> {
        let before = self.simulations.len();
        self.simulations.retain(|s| s.id != id);
        if self.simulations.len() == before {
            return Err(BizPlanError::NotFound(format!("simulation '{id}'")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(rename = "savedSimulations", default)]
    saved_simulations: Vec<SavedSimulation>,
}

/// One JSON document holding the whole collection. Each write replaces the
/// file; the last writer wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> BizPlanResult<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, doc: &StoreDocument) -> BizPlanResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(doc)?)?;
        log::debug!("wrote {} simulations to {}", doc.saved_simulations.len(), self.path.display());
        Ok(())
    }
}

impl SimulationStore for JsonFileStore {
    fn list(&self) -> BizPlanResult<Vec<SavedSimulation>> {
        Ok(self.read()?.saved_simulations)
    }

    fn save(&mut self, name: &str, data: Vec<SummaryPeriodRecord>) -> BizPlanResult<SavedSimulation> {
        let mut doc = self.read()?;
        let sim = new_simulation(name, data, &doc.saved_simulations)?;
        doc.saved_simulations.push(sim.clone());
        self.write(&doc)?;
        Ok(sim)
    }

    fn delete(&mut self, id: &str) -> BizPlanResult<()> {
        let mut doc = self.read()?;
        let before = doc.saved_simulations.len();
        doc.saved_simulations.retain(|s| s.id != id);
        if doc.saved_simulations.len() == before {
            return Err(BizPlanError::NotFound(format!("simulation '{id}'")));
        }
        self.write(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{derive_summary, PeriodRecord};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn data() -> Vec<SummaryPeriodRecord> {
        vec![derive_summary(&PeriodRecord::new("2026-01", dec!(100), dec!(70), None, None))]
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bizplan-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn test_name_is_trimmed_and_required() {
        let mut store = MemoryStore::new();
        let sim = store.save("  base case ", data()).unwrap();
        assert_eq!(sim.name, "base case");
        assert!(sim.id.starts_with("sim-"));

        assert!(matches!(store.save("   ", data()), Err(BizPlanError::InvalidInput { .. })));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_ids_stay_unique_within_one_millisecond() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let first = SavedSimulation {
            id: next_id(now, &[]),
            name: "a".into(),
            data: vec![],
            created_at: now,
        };
        assert_eq!(first.id, "sim-1700000000000");
        assert_eq!(next_id(now, &[first]), "sim-1700000000001");
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let mut store = MemoryStore::new();
        assert!(matches!(store.delete("sim-1"), Err(BizPlanError::NotFound(_))));
        let sim = store.save("x", data()).unwrap();
        store.delete(&sim.id).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_select_preserves_order() {
        let mut store = MemoryStore::new();
        let a = store.save("a", data()).unwrap();
        let b = store.save("b", data()).unwrap();
        let picked = store.select(&[b.id.clone(), a.id.clone()]).unwrap();
        assert_eq!(picked[0].name, "b");
        assert!(store.select(&["missing".into()]).is_err());
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let path = temp_path("store");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::new(&path);
        assert!(store.list().unwrap().is_empty());
        let sim = store.save("plan A", data()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[STORE_KEY][0]["name"], "plan A");
        assert!(raw[STORE_KEY][0].get("createdAt").is_some());

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.list().unwrap(), vec![sim.clone()]);

        store.delete(&sim.id).unwrap();
        assert!(store.list().unwrap().is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_invalid_name_writes_nothing() {
        let path = temp_path("noop");
        let _ = fs::remove_file(&path);
        let mut store = JsonFileStore::new(&path);
        assert!(store.save("", data()).is_err());
        assert!(!path.exists());
    }
}
