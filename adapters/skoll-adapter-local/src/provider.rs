//! Provider registration for the local backends.
//!
//! [`LocalProvider`] is the discovery point the host framework talks to:
//! it lists the available backend names and instantiates backends on
//! demand, mirroring the registry-based plugin mechanism in `skoll-hal`.

use std::fmt;

use skoll_hal::{Backend, BackendConfig, BackendRegistry, HalResult};

use crate::qasm_backend::QasmBackend;
use crate::statevector_backend::StatevectorBackend;
use crate::{QASM_SIMULATOR, STATEVECTOR_SIMULATOR};

/// A registry with both local simulators registered.
pub fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<StatevectorBackend>(STATEVECTOR_SIMULATOR);
    registry.register::<QasmBackend>(QASM_SIMULATOR);
    registry
}

/// Provider exposing the local simulator backends.
pub struct LocalProvider {
    registry: BackendRegistry,
}

impl LocalProvider {
    /// Create a provider with both local backends available.
    pub fn new() -> Self {
        Self {
            registry: registry(),
        }
    }

    /// Available backend names, optionally filtered by name.
    pub fn backends(&self, name: Option<&str>) -> Vec<String> {
        self.registry
            .available_backends()
            .into_iter()
            .filter(|backend| name.is_none_or(|n| backend == n))
            .collect()
    }

    /// Instantiate a backend by name with default configuration.
    pub fn get_backend(&self, name: &str) -> HalResult<Box<dyn Backend>> {
        self.registry.create(name, BackendConfig::new(name))
    }

    /// Instantiate a backend by name with a custom configuration.
    pub fn get_backend_with_config(
        &self,
        name: &str,
        config: BackendConfig,
    ) -> HalResult<Box<dyn Backend>> {
        self.registry.create(name, config)
    }

    /// The underlying registry, for registering additional backends.
    pub fn registry_mut(&mut self) -> &mut BackendRegistry {
        &mut self.registry
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sköll local simulator provider")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_lists_both_backends() {
        let provider = LocalProvider::new();
        assert_eq!(
            provider.backends(None),
            vec![QASM_SIMULATOR, STATEVECTOR_SIMULATOR]
        );
    }

    #[test]
    fn provider_filters_by_name() {
        let provider = LocalProvider::new();
        assert_eq!(
            provider.backends(Some(STATEVECTOR_SIMULATOR)),
            vec![STATEVECTOR_SIMULATOR]
        );
        assert!(provider.backends(Some("nope")).is_empty());
    }

    #[test]
    fn get_backend_by_name() {
        let provider = LocalProvider::new();
        let backend = provider.get_backend(QASM_SIMULATOR).unwrap();
        assert_eq!(backend.name(), QASM_SIMULATOR);

        assert!(provider.get_backend("unknown").is_err());
    }

    #[test]
    fn additional_backends_can_be_registered() {
        use skoll_hal::HalError;

        let mut provider = LocalProvider::new();
        provider
            .registry_mut()
            .register_factory("tensor_simulator", |_config| {
                Err(HalError::BackendUnavailable("not built".into()))
            });

        assert_eq!(provider.backends(None).len(), 3);
        assert!(provider.get_backend("tensor_simulator").is_err());
    }
}
