//! Detector registry
//!
//! Maps detector names to their implementations in a stable order.

use crate::{
    BrandDetector, BreastfeedingDetector, DifficultInsertionDetector, ExpulsionDetector,
    InsertionDetector, ParityDetector, PerforationDetector, RadiologyExpulsionDetector,
    RemovalDetector,
};
use crate::detector::Detector;
use apex_core::ApexResult;
use apex_diagnostics::{APX0301, ApexError};
use indexmap::IndexMap;
use std::sync::Arc;

/// Shared handle to a detector
pub type DetectorRef = Arc<dyn Detector>;

/// Registry of detectors keyed by name
#[derive(Default, Clone)]
pub struct DetectorRegistry {
    detectors: IndexMap<&'static str, DetectorRef>,
}

impl DetectorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in detector
    pub fn with_defaults() -> ApexResult<Self> {
        let mut registry = Self::new();
        registry.register(InsertionDetector::new()?);
        registry.register(PerforationDetector::new()?);
        registry.register(BrandDetector::new()?);
        registry.register(DifficultInsertionDetector::new()?);
        registry.register(RemovalDetector::new()?);
        registry.register(ExpulsionDetector::new()?);
        registry.register(RadiologyExpulsionDetector::new()?);
        registry.register(ParityDetector::new()?);
        registry.register(BreastfeedingDetector::new()?);
        Ok(registry)
    }

    /// Register a detector, replacing any detector with the same name
    pub fn register<D: Detector + 'static>(&mut self, detector: D) {
        self.detectors.insert(detector.name(), Arc::new(detector));
    }

    /// Get a detector by name
    pub fn get(&self, name: &str) -> Option<&DetectorRef> {
        self.detectors.get(name)
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.detectors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Resolve a selection of names
    ///
    /// An empty selection means every registered detector. Unknown names are
    /// a configuration error.
    pub fn select(&self, names: &[String]) -> ApexResult<Vec<DetectorRef>> {
        if names.is_empty() {
            return Ok(self.detectors.values().cloned().collect());
        }
        names
            .iter()
            .map(|name| {
                self.get(name).cloned().ok_or_else(|| {
                    ApexError::config(APX0301, format!("unknown algorithm `{}`", name))
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.detectors.keys()).finish()
    }
}
