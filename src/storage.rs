//! Fluid Layer Storage
//!
//! The fluid column is persisted as a full snapshot: every write deletes all
//! stored layers and inserts the new set. `LayerStore` is the collaborator
//! interface; an in-memory and a sled-backed implementation are provided.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::types::FluidLayer;

/// Error type for storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err.to_string())
    }
}

/// Delete-all / insert-all persistence for the fluid layer column.
pub trait LayerStore {
    /// Replace every stored layer with `layers`, preserving their order.
    fn replace_all(&mut self, layers: &[FluidLayer]) -> Result<(), StoreError>;

    /// All stored layers in insertion order.
    fn load_all(&self) -> Result<Vec<FluidLayer>, StoreError>;
}

/// Volatile store, mainly for tests and one-shot CLI runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryLayerStore {
    layers: Vec<FluidLayer>,
}

impl LayerStore for MemoryLayerStore {
    fn replace_all(&mut self, layers: &[FluidLayer]) -> Result<(), StoreError> {
        self.layers = layers.to_vec();
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<FluidLayer>, StoreError> {
        Ok(self.layers.clone())
    }
}

/// Sled-backed layer store.
///
/// Key: insertion index as u64 big-endian bytes (sorts in column order)
/// Value: JSON-serialized `FluidLayer`
#[derive(Clone)]
pub struct SledLayerStore {
    db: Arc<sled::Db>,
    tree: sled::Tree,
}

impl SledLayerStore {
    const TREE: &'static str = "fluid_layers";

    /// Open or create the layer store at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let tree = db.open_tree(Self::TREE)?;
        Ok(Self {
            db: Arc::new(db),
            tree,
        })
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

impl LayerStore for SledLayerStore {
    /// Removal of the old snapshot and insertion of the new one are applied
    /// as one atomic batch.
    fn replace_all(&mut self, layers: &[FluidLayer]) -> Result<(), StoreError> {
        let mut batch = sled::Batch::default();
        for key in self.tree.iter().keys() {
            batch.remove(key?);
        }
        for (i, layer) in layers.iter().enumerate() {
            let key = (i as u64).to_be_bytes();
            batch.insert(key.to_vec(), serde_json::to_vec(layer)?);
        }
        self.tree.apply_batch(batch)?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<FluidLayer>, StoreError> {
        self.tree
            .iter()
            .values()
            .map(|value| -> Result<FluidLayer, StoreError> {
                Ok(serde_json::from_slice(&value?)?)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Domain, FluidSpec};

    fn layers(n: usize) -> Vec<FluidLayer> {
        (0..n)
            .map(|i| {
                FluidLayer::new(
                    Domain::Annulus,
                    i as f64 * 100.0,
                    (i + 1) as f64 * 100.0,
                    FluidSpec::named(i as u64, format!("fluid {i}"), 1000.0 + i as f64),
                    "",
                )
            })
            .collect()
    }

    #[test]
    fn test_sled_replace_all_drops_previous_snapshot() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = SledLayerStore::open(dir.path()).expect("open sled");

        store.replace_all(&layers(12)).expect("write");
        assert_eq!(store.load_all().expect("read").len(), 12);

        store.replace_all(&layers(3)).expect("write");
        let loaded = store.load_all().expect("read");
        assert_eq!(loaded, layers(3));
    }

    #[test]
    fn test_sled_preserves_order_past_ten_entries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = SledLayerStore::open(dir.path()).expect("open sled");
        store.replace_all(&layers(15)).expect("write");
        store.flush().expect("flush");
        let tops: Vec<f64> = store.load_all().expect("read").iter().map(|l| l.top_m).collect();
        assert!(tops.windows(2).all(|w| w[0] < w[1]));
    }
}
