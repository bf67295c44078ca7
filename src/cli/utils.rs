use std::io::Read;

use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::store::RecordId;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(data_value) = data {
                println!("{}", serde_json::to_string_pretty(&data_value)?);
            }
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, status: Option<u16>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(status) = status {
                response["status"] = json!(status);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a collection, one compact line per record in text mode
pub fn output_records(output_format: &OutputFormat, collection_name: &str, records: &[Value]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = serde_json::Map::new();
            response.insert(collection_name.to_string(), Value::from(records.to_vec()));
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No {} found", collection_name);
            }
            for record in records {
                let id = record.get("id").map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
                println!("{}\t{}", id, record);
            }
        }
    }
    Ok(())
}

/// Read one JSON object from stdin
pub fn read_json_stdin() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    parse_json_object(&input)
}

pub fn parse_json_object(input: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(input).map_err(|e| anyhow::anyhow!("stdin is not valid JSON: {}", e))?;
    if !value.is_object() {
        anyhow::bail!("expected a JSON object on stdin");
    }
    Ok(value)
}

/// Parse `PRODUCT_ID:QTY` pairs; a missing quantity means one.
pub fn parse_items(items: &[String]) -> anyhow::Result<Vec<(RecordId, u32)>> {
    items
        .iter()
        .map(|item| {
            let (id, qty) = match item.split_once(':') {
                Some((id, qty)) => {
                    let qty = qty
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| anyhow::anyhow!("invalid quantity in '{}'", item))?;
                    (id, qty)
                }
                None => (item.as_str(), 1),
            };
            let id = id.trim();
            if id.is_empty() {
                anyhow::bail!("missing product id in '{}'", item);
            }
            Ok((RecordId::parse_loose(id), qty))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_parse_with_default_quantity() {
        let items = parse_items(&["1:2".to_string(), "abc".to_string()]).unwrap();
        assert_eq!(items, vec![(RecordId::Number(1), 2), (RecordId::from("abc"), 1)]);
    }

    #[test]
    fn bad_items_are_rejected() {
        assert!(parse_items(&["1:x".to_string()]).is_err());
        assert!(parse_items(&[":3".to_string()]).is_err());
    }

    #[test]
    fn stdin_must_be_an_object() {
        assert!(parse_json_object(r#"{"total": 1}"#).is_ok());
        assert!(parse_json_object("[1]").is_err());
        assert!(parse_json_object("nope").is_err());
    }
}
