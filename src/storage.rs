//! Persistence sink behind the collection save routines.

use crate::types::Operation;
use std::io;

pub trait StorageEngine: Send + Sync {
    fn append(&mut self, operation: &Operation) -> io::Result<()>;
    fn read_all(&self) -> io::Result<Vec<Operation>>;
}

/// Keeps every appended operation in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    log: Vec<Operation>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

impl StorageEngine for MemoryStorage {
    fn append(&mut self, operation: &Operation) -> io::Result<()> {
        self.log.push(operation.clone());
        Ok(())
    }

    fn read_all(&self) -> io::Result<Vec<Operation>> {
        Ok(self.log.clone())
    }
}
