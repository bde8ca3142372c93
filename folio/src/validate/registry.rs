//! Registries of schemas.

use crate::error::{Error, Result};
use crate::validate::builtin;
use crate::validate::schema::Schema;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// An ordered collection of schemas with unique names.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<Arc<Schema>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in schemas.
    pub fn with_builtin() -> Self {
        Self {
            schemas: builtin::schemas().into_iter().map(Arc::new).collect(),
        }
    }

    /// Register a schema. Fails if a schema of the same name is already registered.
    pub fn register(&mut self, schema: Schema) -> Result<()> {
        if self.get(schema.name()).is_some() {
            return Err(Error::DuplicateSchema(schema.name().to_string()));
        }

        self.schemas.push(Arc::new(schema));

        Ok(())
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.iter().find(|s| s.name() == name).cloned()
    }

    /// The names of all schemas, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.schemas.iter().map(|s| s.name().to_string()).collect()
    }
}

fn global() -> &'static RwLock<SchemaRegistry> {
    static REGISTRY: OnceLock<RwLock<SchemaRegistry>> = OnceLock::new();

    REGISTRY.get_or_init(|| RwLock::new(SchemaRegistry::with_builtin()))
}

/// Register a schema in the process-wide registry.
pub fn register_schema(schema: Schema) -> Result<()> {
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(schema)
}

/// Look up a schema in the process-wide registry.
pub(crate) fn global_schema(name: &str) -> Option<Arc<Schema>> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
}

/// The names of all schemas in the process-wide registry, in registration order.
pub fn get_available_schemas() -> Vec<String> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .names()
}
