//! # Configuration facade
//!
//! Persistent configuration is owned by the host firmware. The core only
//! consumes this interface: the remote button indication updates URL slot 1
//! through [ConfigHandle::set]. Storage layout and persistence timing are
//! the implementor's concern.

/// Configurable fields
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigField {
    Url1,
    Url2,
}

/// Host-side configuration store.
///
/// `handle_change` must be invoked regularly by the host: it applies a 500ms
/// debounce before persisting either an updated field or a requested commit,
/// coalescing rapid repeated changes into one write.
pub trait ConfigHandle {
    /// Loads the persisted configuration record
    fn load(&mut self);

    /// Persists the configuration record immediately
    fn commit(&mut self);

    /// Updates a field and marks the configuration as changed
    fn set(&mut self, field: ConfigField, value: &[u8]);

    /// Requests a debounced commit on the next quiet period
    fn request_commit(&mut self);

    /// Debounced persistence tick, to be called periodically by the host
    fn handle_change(&mut self);
}
