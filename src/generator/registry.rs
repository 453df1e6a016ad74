//! Name → generator registry.

use super::basic::{
    BooleanGenerator, IntegerGenerator, SerialGenerator, TextGenerator, TimestampGenerator,
    VarcharGenerator,
};
use super::semantic::{SemanticGenerator, SemanticKind};
use super::Generator;
use crate::error::RegistryError;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

static DEFAULT_REGISTRY: Lazy<GeneratorRegistry> = Lazy::new(GeneratorRegistry::with_builtins);

/// Process-wide registry holding the built-in generators.
///
/// Meant for top-level wiring only; library code takes a registry by
/// reference so tests can use private ones.
pub fn default_registry() -> &'static GeneratorRegistry {
    &DEFAULT_REGISTRY
}

/// Thread-safe registry of named generators.
///
/// Names are unique: registering a taken name is an error rather than a
/// silent overwrite.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: RwLock<AHashMap<String, Arc<dyn Generator>>>,
}

impl GeneratorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the basic and semantic generators.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        let builtins: Vec<Arc<dyn Generator>> = vec![
            Arc::new(IntegerGenerator),
            Arc::new(VarcharGenerator::default()),
            Arc::new(TextGenerator::default()),
            Arc::new(TimestampGenerator),
            Arc::new(BooleanGenerator),
            Arc::new(SerialGenerator),
        ];
        let semantic = SemanticKind::ALL
            .iter()
            .map(|&kind| Arc::new(SemanticGenerator::new(kind)) as Arc<dyn Generator>);

        let mut map = registry.write();
        for generator in builtins.into_iter().chain(semantic) {
            map.insert(generator.name().to_string(), generator);
        }
        drop(map);
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, AHashMap<String, Arc<dyn Generator>>> {
        self.generators.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AHashMap<String, Arc<dyn Generator>>> {
        self.generators.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `generator` under `name`.
    pub fn register(
        &self,
        name: impl Into<String>,
        generator: Arc<dyn Generator>,
    ) -> Result<(), RegistryError> {
        use std::collections::hash_map::Entry;

        let name = name.into();
        match self.write().entry(name) {
            Entry::Occupied(entry) => Err(RegistryError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(generator);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Generator>, RegistryError> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
