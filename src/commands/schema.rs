use crate::commands::Out;
use crate::model::AppState;
use crate::Result;
use anyhow::Context;

/// Returns the JSON Schema of the ledger document, which is also the format of export files.
pub async fn schema() -> Result<Out<serde_json::Value>> {
    let schema = schemars::schema_for!(AppState);
    let value = serde_json::to_value(&schema).context("Unable to serialize the schema")?;
    let pretty = serde_json::to_string_pretty(&value).context("Unable to format the schema")?;
    Ok(Out::new(pretty, value))
}
