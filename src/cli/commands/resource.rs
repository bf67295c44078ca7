use serde_json::Value;

use crate::cli::utils::{output_records, output_success, read_json_stdin};
use crate::cli::{OutputFormat, Session};
use crate::resources::ResourceKind;
use crate::store::{RecordId, ResourceStore};

fn store(session: &Session, kind: ResourceKind) -> anyhow::Result<ResourceStore<Value>> {
    let endpoint = kind.endpoint(&session.base)?;
    Ok(ResourceStore::new(session.http.clone(), endpoint))
}

pub async fn list(session: &Session, kind: ResourceKind, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = store(session, kind)?;
    store.fetch_all().await.into_result()?;
    output_records(&output_format, kind.path(), &store.records().await)
}

pub async fn create(session: &Session, kind: ResourceKind, output_format: OutputFormat) -> anyhow::Result<()> {
    let record = read_json_stdin()?;
    let created = store(session, kind)?.create(&record).await.into_result()?;
    output_success(&output_format, &format!("Created record in {}", kind.path()), Some(created))
}

pub async fn update(session: &Session, kind: ResourceKind, id: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut record = read_json_stdin()?;
    let id = RecordId::parse_loose(id);
    record["id"] = serde_json::to_value(&id)?;

    let updated = store(session, kind)?.update(record).await.into_result()?;
    output_success(&output_format, &format!("Updated {}/{}", kind.path(), id), Some(updated))
}

pub async fn delete(session: &Session, kind: ResourceKind, id: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let id = RecordId::parse_loose(id);
    store(session, kind)?.delete(&id).await.into_result()?;
    output_success(&output_format, &format!("Deleted {}/{}", kind.path(), id), None)
}
