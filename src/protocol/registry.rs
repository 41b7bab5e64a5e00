use std::collections::HashMap;

use super::{OpenFlags, OpenOptions, ProtocolDescriptor, UrlProtocol};
use crate::errors::{ProtocolError, ProtocolResult};

/// Protocols known to the host, keyed by URL scheme.
///
/// Built and populated explicitly during process start-up; nothing registers
/// itself. Dropping the registry or calling `unregister` tears a protocol down.
#[derive(Debug, Default)]
pub struct ProtocolRegistry {
    protocols: HashMap<String, ProtocolDescriptor>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ProtocolDescriptor) -> ProtocolResult<()> {
        if self.protocols.contains_key(&descriptor.name) {
            return Err(ProtocolError::AlreadyRegistered(descriptor.name));
        }

        log::debug!(
            "[ProtocolRegistry] Registered '{}' ({}, {} bytes state, {} options)",
            descriptor.name,
            descriptor.class_name,
            descriptor.priv_data_size,
            descriptor.options.len()
        );
        self.protocols.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let removed = self.protocols.remove(name).is_some();
        if removed {
            log::debug!("[ProtocolRegistry] Unregistered '{}'", name);
        }
        removed
    }

    pub fn descriptor(&self, name: &str) -> Option<&ProtocolDescriptor> {
        self.protocols.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.protocols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Open `url` with the protocol named by its scheme.
    ///
    /// Options declared by the protocol are consumed from `options`; the
    /// rest are left for the caller.
    pub fn open_url(
        &self,
        url: &str,
        flags: OpenFlags,
        options: &mut OpenOptions,
    ) -> ProtocolResult<Box<dyn UrlProtocol>> {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| ProtocolError::ProtocolNotFound(url.to_string()))?;

        let descriptor = self
            .protocols
            .get(scheme)
            .ok_or_else(|| ProtocolError::ProtocolNotFound(scheme.to_string()))?;

        let protocol = (descriptor.open)(url, flags, options)?;

        for spec in &descriptor.options {
            options.remove(spec.name);
        }
        if !options.is_empty() {
            log::warn!(
                "[ProtocolRegistry] '{}' ignored options: {:?}",
                scheme,
                options.keys().collect::<Vec<_>>()
            );
        }

        Ok(protocol)
    }
}
