use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{DnsProvider, DomainRecord, ProviderError, RecordPage};

/// In-memory provider that serves one domain and counts its calls.
pub struct FakeProvider {
    domain: String,
    records: Mutex<Vec<DomainRecord>>,
    fail_edits: bool,
    list_calls: AtomicUsize,
    edit_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(domain: &str, records: Vec<(&str, &str, &str)>) -> Self {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, (record_type, name, data))| DomainRecord {
                id: i as u64 + 1,
                record_type: record_type.to_string(),
                name: name.to_string(),
                data: data.to_string(),
            })
            .collect();

        Self {
            domain: domain.to_string(),
            records: Mutex::new(records),
            fail_edits: false,
            list_calls: AtomicUsize::new(0),
            edit_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn edit_calls(&self) -> usize {
        self.edit_calls.load(Ordering::SeqCst)
    }

    pub fn data_of(&self, id: u64) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.data.clone())
    }
}

#[async_trait]
impl DnsProvider for FakeProvider {
    async fn list_records(&self, domain: &str) -> Result<RecordPage, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if domain != self.domain {
            return Err(ProviderError::Api {
                status: 404,
                message: "not_found: domain".to_string(),
            });
        }
        let records = self.records.lock().unwrap().clone();
        Ok(RecordPage {
            total: Some(records.len()),
            records,
        })
    }

    async fn edit_record(&self, domain: &str, id: u64, data: &str) -> Result<(), ProviderError> {
        self.edit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_edits || domain != self.domain {
            return Err(ProviderError::Api {
                status: 500,
                message: "server_error: edit failed".to_string(),
            });
        }
        let mut records = self.records.lock().unwrap();
        let record = records.iter_mut().find(|r| r.id == id).ok_or(ProviderError::Api {
            status: 404,
            message: "not_found: record".to_string(),
        })?;
        record.data = data.to_string();
        Ok(())
    }
}
