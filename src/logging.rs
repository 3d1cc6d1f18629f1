//! Per-viewer diagnostic logging
//!
//! Every viewer decides on its own whether it logs, through the `debug`
//! option of its configuration. Lines are prefixed with the viewer's log id
//! so several viewers on one page can be told apart. Output goes through the
//! `log` facade when the `debug` feature is enabled, and to the browser
//! console under the `wasm` feature.

use serde::Serialize;
use std::fmt;

/// Logger bound to one viewer instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceLogger {
    id: String,
    enabled: bool,
}

impl InstanceLogger {
    pub fn new(id: &str, enabled: bool) -> Self {
        Self {
            id: id.to_string(),
            enabled,
        }
    }

    /// Logger for a viewer placed in a container.
    ///
    /// The id is the container's element id, else the configured log id,
    /// else [`DEFAULT_LOG_ID`](crate::constants::DEFAULT_LOG_ID).
    pub fn for_instance(container_id: Option<&str>, log_id: Option<&str>, enabled: bool) -> Self {
        let id = container_id
            .filter(|id| !id.is_empty())
            .or(log_id)
            .unwrap_or(crate::constants::DEFAULT_LOG_ID);
        Self::new(id, enabled)
    }

    /// A logger that never writes anything
    pub fn disabled() -> Self {
        Self::new(crate::constants::DEFAULT_LOG_ID, false)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Writes one line if this instance has logging enabled
    pub fn log(&self, args: fmt::Arguments<'_>) {
        if !self.enabled {
            return;
        }

        #[cfg(feature = "debug")]
        log::debug!(target: "largeview", "{}: {}", self.id, args);

        #[cfg(feature = "wasm")]
        web_sys::console::log_1(&format!("{}: {}", self.id, args).into());

        #[cfg(not(any(feature = "debug", feature = "wasm")))]
        let _ = args;
    }

    /// Dumps a structured value as JSON under a label
    pub fn dump<T: Serialize + ?Sized>(&self, label: &str, value: &T) {
        if !self.enabled {
            return;
        }

        match serde_json::to_string(value) {
            Ok(json) => self.log(format_args!("{}: {}", label, json)),
            Err(e) => self.log(format_args!("{}: <unserializable: {}>", label, e)),
        }
    }
}

impl Default for InstanceLogger {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Writes a formatted line through an [`InstanceLogger`]
#[macro_export]
macro_rules! viewer_log {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log(format_args!($($arg)*))
    };
}
