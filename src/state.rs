use crate::errors::SourceError;
use crate::models::Record;
use crate::source::RecordSource;
use std::{future::Future, sync::Arc};
use tokio::sync::Mutex;

type Snapshot = Arc<Vec<Record>>;

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn RecordSource>,
    contacts: Arc<Mutex<Option<Snapshot>>>,
    leads: Arc<Mutex<Option<Snapshot>>>,
}

impl AppState {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            contacts: Arc::new(Mutex::new(None)),
            leads: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn contacts(&self) -> Result<Snapshot, SourceError> {
        cached(&self.contacts, self.source.fetch_contacts()).await
    }

    pub async fn leads(&self) -> Result<Snapshot, SourceError> {
        cached(&self.leads, self.source.fetch_leads()).await
    }

    /// Drops both snapshots; the next read fetches again.
    pub async fn invalidate(&self) {
        *self.contacts.lock().await = None;
        *self.leads.lock().await = None;
    }
}

// The slot stays locked while fetching so concurrent readers share one request.
async fn cached<F>(slot: &Mutex<Option<Snapshot>>, fetch: F) -> Result<Snapshot, SourceError>
where
    F: Future<Output = Result<Vec<Record>, SourceError>>,
{
    let mut slot = slot.lock().await;
    if let Some(records) = slot.as_ref() {
        return Ok(Arc::clone(records));
    }
    let records = Arc::new(fetch.await?);
    *slot = Some(Arc::clone(&records));
    Ok(records)
}
