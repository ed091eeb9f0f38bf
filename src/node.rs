//! Node Module
//!
//! Explicit readiness for code that reaches the log from outside the crate
//! (FFI exports, request handlers). Instead of a process-wide "is the store
//! up" flag checked ad hoc, callers hold a [`NodeSlot`] and must obtain a
//! started [`Node`] from it before touching a log.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, SeqLogError};
use crate::log::Log;

/// A started node: the log plus the config it was opened with
#[derive(Debug)]
pub struct Node<V> {
    log: Log<V>,
}

impl<V> Node<V> {
    pub fn log(&self) -> &Log<V> {
        &self.log
    }

    pub fn config(&self) -> &Config {
        self.log.config()
    }
}

/// Holds a node once it has been started
pub struct NodeSlot<V> {
    slot: RwLock<Option<Arc<Node<V>>>>,
}

impl<V> NodeSlot<V> {
    /// An empty slot; `get` fails with `NotInitialized` until `start`
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Open a log and publish the node
    pub fn start(&self, config: Config) -> Result<Arc<Node<V>>> {
        let mut slot = self.slot.write();
        if slot.is_some() {
            return Err(SeqLogError::Config("node already started".to_string()));
        }

        let node = Arc::new(Node {
            log: Log::new(config)?,
        });
        *slot = Some(Arc::clone(&node));

        tracing::info!("node started");
        Ok(node)
    }

    /// The started node
    pub fn get(&self) -> Result<Arc<Node<V>>> {
        self.slot.read().clone().ok_or(SeqLogError::NotInitialized)
    }

    /// Unpublish the node; handles already obtained stay usable
    pub fn stop(&self) -> Option<Arc<Node<V>>> {
        let node = self.slot.write().take();
        if node.is_some() {
            tracing::info!("node stopped");
        }
        node
    }

    pub fn is_started(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl<V> Default for NodeSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}
