//! Error types for the plugin layer.

/// Errors that can occur while assembling a plugin chain.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A plugin with the same name is already registered.
    #[error("plugin {0} is already registered")]
    Duplicate(&'static str),
}
