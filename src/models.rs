use crate::period::Granularity;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Contact,
    Lead,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Contact => "contact",
            RecordKind::Lead => "lead",
        }
    }

    /// Collection name used by the spreadsheet API.
    pub fn resource(self) -> &'static str {
        match self {
            RecordKind::Contact => "contactos",
            RecordKind::Lead => "leads",
        }
    }
}

/// A contact or lead as read from the spreadsheet. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub kind: RecordKind,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub registered_at: Option<String>,
    pub origin: Option<String>,
    pub county: Option<String>,
    pub status: Option<String>,
    pub archived: Option<String>,
}

impl Record {
    pub fn from_row(kind: RecordKind, index: usize, row: SheetRow) -> Self {
        let registered_at = match kind {
            RecordKind::Contact => row.dataregisto.or(row.datacontactolead),
            RecordKind::Lead => row.datacontactolead.or(row.dataregisto),
        };
        Self {
            id: row
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("{}-{index}", kind.as_str())),
            kind,
            name: row.nome,
            email: row.email,
            phone: row.telefone,
            address: row.endereco,
            registered_at,
            origin: row.origemcontacto.or(row.origem),
            county: match kind {
                RecordKind::Contact => row.concelho,
                RecordKind::Lead => None,
            },
            status: row.status,
            archived: row.arquivado,
        }
    }
}

/// One row of the `contactos` or `leads` sheet. Every cell is optional and
/// the sheet service may hand numbers back for numeric-looking cells.
#[derive(Debug, Default, Deserialize)]
pub struct SheetRow {
    #[serde(default, deserialize_with = "cell")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub telefone: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub endereco: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub dataregisto: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub datacontactolead: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub origemcontacto: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub origem: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub concelho: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub arquivado: Option<String>,
}

fn cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Text(text)) => Some(text),
        Some(Cell::Number(number)) => Some(number.to_string()),
        Some(Cell::Flag(flag)) => Some(flag.to_string()),
        None => None,
    })
}

/// The caller's current selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodQuery {
    pub period: Granularity,
    pub realtime: bool,
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub period: Granularity,
    #[serde(default)]
    pub realtime: bool,
    pub at: Option<String>,
}

impl DashboardParams {
    pub fn query(&self) -> PeriodQuery {
        PeriodQuery {
            period: self.period,
            realtime: self.realtime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub key: String,
    pub label: String,
    pub count: usize,
}

impl From<&Bucket> for BucketSummary {
    fn from(bucket: &Bucket) -> Self {
        Self {
            key: bucket.key.clone(),
            label: bucket.label.clone(),
            count: bucket.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category: String,
    pub current: usize,
    pub previous: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total: usize,
    pub converted: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRow {
    pub category: String,
    pub current: ConversionStats,
    pub previous: ConversionStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub key: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCounts {
    pub current: usize,
    pub previous: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub period: Granularity,
    pub realtime: bool,
    pub generated_at: String,
    pub comparison: bool,
    pub contacts: PeriodCounts,
    pub leads: PeriodCounts,
    pub active_contacts: usize,
    pub origins: Vec<CategoryRow>,
    pub counties: Vec<CategoryRow>,
    pub conversion_by_origin: Vec<ConversionRow>,
    pub statuses: Vec<CategoryRow>,
    pub lead_origins: Vec<CategoryRow>,
    pub buckets: Vec<BucketSummary>,
    pub trend: Vec<TrendPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub refreshed: bool,
}
