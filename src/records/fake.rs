use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{client::RecordStore, types::Collection};
use crate::error::AuthError;

/// In-process stand-in for the `tables/*` API.
#[derive(Default)]
pub struct FakeRecords {
    tables: Mutex<HashMap<Collection, Vec<Value>>>,
    failing: Mutex<HashSet<Collection>>,
    lists: AtomicUsize,
    creates: AtomicUsize,
}

impl FakeRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, collection: Collection, rows: Vec<Value>) -> Self {
        self.tables.lock().unwrap().insert(collection, rows);
        self
    }

    pub fn fail(&self, collection: Collection) {
        self.failing.lock().unwrap().insert(collection);
    }

    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    fn check(&self, collection: Collection) -> Result<(), AuthError> {
        if self.failing.lock().unwrap().contains(&collection) {
            return Err(AuthError::network());
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FakeRecords {
    async fn list_records(&self, collection: Collection) -> Result<Vec<Value>, AuthError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.check(collection)?;
        Ok(self.rows(collection))
    }

    async fn create_record(
        &self,
        collection: Collection,
        mut record: Value,
    ) -> Result<Value, AuthError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check(collection)?;
        record["id"] = json!(uuid::Uuid::new_v4().to_string());
        self.tables
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(record.clone());
        Ok(record)
    }
}
