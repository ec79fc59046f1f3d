//! Dynamic backend plugins.
//!
//! Third-party simulator backends can be loaded from shared libraries
//! (`.so` on Linux, `.dylib` on macOS) at runtime. A plugin exports a
//! constructor function named `skoll_plugin_create` returning a boxed
//! [`BackendPlugin`].
//!
//! Requires `--features dynamic-backends`.

use crate::backend::{Backend, BackendConfig};
#[cfg(feature = "dynamic-backends")]
use crate::error::HalError;
use crate::error::HalResult;

/// Trait implemented by dynamic backend plugins.
pub trait BackendPlugin: Send + Sync {
    /// Unique name identifying this plugin's backend.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Plugin version string.
    fn version(&self) -> &str;

    /// Create a backend instance from the given configuration.
    fn create_backend(&self, config: BackendConfig) -> HalResult<Box<dyn Backend>>;
}

/// Metadata for a loaded plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Plugin name.
    pub name: String,
    /// Plugin description.
    pub description: String,
    /// Plugin version.
    pub version: String,
    /// Path to the shared library.
    pub library_path: String,
}

/// Type signature of the constructor exported by plugin libraries.
///
/// The returned pointer is a Rust trait object, so this is Rust-to-Rust
/// FFI only: host and plugin must be built with the same compiler
/// version, allocator, and codegen settings, or the vtable layout will
/// not match.
#[cfg(feature = "dynamic-backends")]
#[allow(improper_ctypes_definitions)]
pub type PluginCreateFn = unsafe extern "C" fn() -> *mut dyn BackendPlugin;

/// A plugin backed by a loaded shared library.
#[cfg(feature = "dynamic-backends")]
pub struct LoadedPlugin {
    plugin: Box<dyn BackendPlugin>,
    _library: libloading::Library,
    path: String,
}

#[cfg(feature = "dynamic-backends")]
impl LoadedPlugin {
    /// Load a plugin from a shared library path.
    ///
    /// # Safety
    ///
    /// The shared library must export `skoll_plugin_create` with the
    /// correct signature. Loading untrusted libraries is inherently
    /// unsafe.
    pub unsafe fn load(path: impl AsRef<std::path::Path>) -> HalResult<Self> {
        let path_str = path.as_ref().display().to_string();

        let library = unsafe {
            libloading::Library::new(path.as_ref())
                .map_err(|e| HalError::Backend(format!("failed to load plugin '{path_str}': {e}")))?
        };

        let create_fn: libloading::Symbol<PluginCreateFn> = unsafe {
            library.get(b"skoll_plugin_create").map_err(|e| {
                HalError::Backend(format!("plugin '{path_str}' missing skoll_plugin_create: {e}"))
            })?
        };

        let raw_plugin = unsafe { create_fn() };
        if raw_plugin.is_null() {
            return Err(HalError::Backend(format!(
                "plugin '{path_str}' returned null from constructor"
            )));
        }

        let plugin = unsafe { Box::from_raw(raw_plugin) };

        Ok(Self {
            plugin,
            _library: library,
            path: path_str,
        })
    }

    /// Plugin metadata.
    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            name: self.plugin.name().to_string(),
            description: self.plugin.description().to_string(),
            version: self.plugin.version().to_string(),
            library_path: self.path.clone(),
        }
    }

    /// Create a backend from this plugin.
    pub fn create_backend(&self, config: BackendConfig) -> HalResult<Box<dyn Backend>> {
        self.plugin.create_backend(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_info_fields() {
        let info = PluginInfo {
            name: "tensor-sim".into(),
            description: "tensor-network simulator".into(),
            version: "0.2.1".into(),
            library_path: "/usr/lib/libtensor_sim.so".into(),
        };

        assert_eq!(info.name, "tensor-sim");
        assert_eq!(info.version, "0.2.1");
    }
}
