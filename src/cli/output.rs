use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a success message, merging `data` into the JSON object when present
pub fn success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message,
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print one `key: value` line per entry in text mode
pub fn fields(output_format: OutputFormat, message: &str, entries: &[(&str, Value)]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let data: serde_json::Map<String, Value> =
                entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
            success(output_format, message, Some(Value::Object(data)))
        }
        OutputFormat::Text => {
            println!("{}", message);
            for (key, value) in entries {
                match value {
                    Value::String(s) => println!("  {}: {}", key, s),
                    Value::Null => println!("  {}: -", key),
                    other => println!("  {}: {}", key, other),
                }
            }
            Ok(())
        }
    }
}
