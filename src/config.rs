//! Configuration for seqlog
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, SeqLogError};

/// Main configuration for a Log instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// Number of sequence slots reserved up front
    pub initial_index_capacity: usize,

    // -------------------------------------------------------------------------
    // Record Store Configuration
    // -------------------------------------------------------------------------
    /// Bytes reserved up front for the record arena
    pub initial_store_capacity: usize,

    /// Largest encoded payload accepted by append (in bytes)
    pub max_record_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_index_capacity: 1024,
            initial_store_capacity: 1024 * 1024, // 1 MB
            max_record_size: 16 * 1024 * 1024,   // 16 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings no log can run with
    pub fn validate(&self) -> Result<()> {
        if self.max_record_size == 0 {
            return Err(SeqLogError::Config(
                "max_record_size must be greater than zero".to_string(),
            ));
        }
        if self.max_record_size > u32::MAX as usize {
            return Err(SeqLogError::Config(format!(
                "max_record_size {} does not fit a frame length",
                self.max_record_size
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the number of index slots reserved up front
    pub fn initial_index_capacity(mut self, slots: usize) -> Self {
        self.config.initial_index_capacity = slots;
        self
    }

    /// Set the record arena reservation (in bytes)
    pub fn initial_store_capacity(mut self, bytes: usize) -> Self {
        self.config.initial_store_capacity = bytes;
        self
    }

    /// Set the maximum encoded record size (in bytes)
    pub fn max_record_size(mut self, bytes: usize) -> Self {
        self.config.max_record_size = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
