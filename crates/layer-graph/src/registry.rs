// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Type-name → factory registry for rebuilding heterogeneous layers.
//!
//! A persisted model is a list of records tagged with a runtime type name.
//! The reader does not know the concrete types in advance; it hands each
//! record to the factory registered under that name and gets back a
//! `Box<dyn Layer>`.
//!
//! The process-wide instance returned by [`LayerRegistry::global`] is built
//! once, on first use, and is read-only afterwards. Callers with custom layer
//! types build their own registry and pass it to
//! [`crate::Model::from_json_with`].

use crate::layers::{Coordinatewise, Sum};
use crate::{Layer, LayerError, RecordReader, RegisteredLayer};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Reconstructs one layer from its record.
pub type LayerFactory = fn(&RecordReader) -> Result<Box<dyn Layer>, LayerError>;

static GLOBAL: OnceLock<LayerRegistry> = OnceLock::new();

fn factory<L: RegisteredLayer>(reader: &RecordReader) -> Result<Box<dyn Layer>, LayerError> {
    Ok(Box::new(L::read(reader)?))
}

/// Maps persisted type names to layer factories.
///
/// The `Input` layer is not an entry: it is always the model's first record
/// and is read by the model itself.
#[derive(Clone, Default)]
pub struct LayerRegistry {
    factories: HashMap<&'static str, LayerFactory>,
}

impl fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("type_names", &self.type_names())
            .finish()
    }
}

impl LayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in computing layer.
    pub fn with_builtin_layers() -> Self {
        let mut registry = Self::new();
        registry.register::<Coordinatewise>().register::<Sum>();
        registry
    }

    /// Returns the shared process-wide registry of built-in layers.
    pub fn global() -> &'static LayerRegistry {
        GLOBAL.get_or_init(|| {
            let registry = Self::with_builtin_layers();
            tracing::debug!("layer registry initialised: {:?}", registry.type_names());
            registry
        })
    }

    /// Registers `L` under [`RegisteredLayer::TYPE_NAME`], replacing any
    /// earlier factory with the same name.
    pub fn register<L: RegisteredLayer>(&mut self) -> &mut Self {
        if self.factories.insert(L::TYPE_NAME, factory::<L>).is_some() {
            tracing::warn!("layer type '{}' registered twice", L::TYPE_NAME);
        }
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Builds the layer registered under `type_name` from `reader`.
    pub fn create(
        &self,
        type_name: &str,
        reader: &RecordReader,
    ) -> Result<Box<dyn Layer>, LayerError> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| LayerError::UnknownLayerType(type_name.to_owned()))?;
        factory(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Input;

    #[test]
    fn test_builtin_names() {
        let registry = LayerRegistry::with_builtin_layers();
        assert_eq!(registry.type_names(), vec!["Coordinatewise", "Sum"]);
        assert!(!registry.contains(Input::TYPE_NAME));
    }

    #[test]
    fn test_global_is_shared() {
        let a = LayerRegistry::global() as *const LayerRegistry;
        let b = LayerRegistry::global() as *const LayerRegistry;
        assert_eq!(a, b);
        assert!(LayerRegistry::global().contains("Sum"));
    }

    #[test]
    fn test_create_dispatches_on_name() {
        let registry = LayerRegistry::with_builtin_layers();
        let reader = RecordReader::from_value(serde_json::json!({
            "version": 1,
            "coordinates": [[{ "layer_index": 0, "element_index": 0 }]]
        }))
        .unwrap();
        let layer = registry.create("Sum", &reader).unwrap();
        assert_eq!(layer.runtime_type_name(), "Sum");
        assert_eq!(layer.size(), 1);
    }

    #[test]
    fn test_unknown_type() {
        let registry = LayerRegistry::new();
        let reader = RecordReader::from_value(serde_json::json!({ "version": 1 })).unwrap();
        assert!(matches!(
            registry.create("Sum", &reader),
            Err(LayerError::UnknownLayerType(name)) if name == "Sum"
        ));
    }
}
