use crate::config::AppConfig;
use crate::errors::SourceError;
use crate::models::{Record, RecordKind, SheetRow};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

/// Read-only access to the clinic's contact and lead collections.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_contacts(&self) -> Result<Vec<Record>, SourceError>;
    async fn fetch_leads(&self) -> Result<Vec<Record>, SourceError>;
}

/// Spreadsheet-as-API backend: each collection is one GET returning a JSON
/// array of rows.
pub struct HttpRecordSource {
    client: Client,
    contacts_url: String,
    leads_url: String,
}

impl HttpRecordSource {
    pub fn new(config: &AppConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            client,
            contacts_url: config.contacts_url.clone(),
            leads_url: config.leads_url.clone(),
        })
    }

    async fn fetch(&self, kind: RecordKind, url: &str) -> Result<Vec<Record>, SourceError> {
        let resource = kind.resource();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SourceError::Request { resource, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(resource, status = status.as_u16(), "record source rejected request");
            return Err(SourceError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        let rows: Vec<SheetRow> = response
            .json()
            .await
            .map_err(|source| SourceError::Decode { resource, source })?;
        let records = records_from_rows(kind, rows);
        info!(resource, count = records.len(), "fetched records");
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_contacts(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::Contact, &self.contacts_url).await
    }

    async fn fetch_leads(&self) -> Result<Vec<Record>, SourceError> {
        self.fetch(RecordKind::Lead, &self.leads_url).await
    }
}

pub fn records_from_rows(kind: RecordKind, rows: Vec<SheetRow>) -> Vec<Record> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| Record::from_row(kind, index, row))
        .collect()
}
