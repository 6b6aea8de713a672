//! Reading and rewriting corpus documents.
//!
//! Documents are handled as raw [`serde_json::Value`]s so that fields this
//! crate does not model survive a rewrite untouched.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub fn read_document(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, document)?;
    writer.flush()?;
    Ok(())
}

/// The `info` section of a well-shaped document.
pub fn info(document: &Value) -> Option<&Map<String, Value>> {
    document.as_object()?.get("info")?.as_object()
}

pub fn info_mut(document: &mut Value) -> Option<&mut Map<String, Value>> {
    document.as_object_mut()?.get_mut("info")?.as_object_mut()
}

/// String value of `info[key]`, empty when absent or not a string.
pub fn string_field(info: &Map<String, Value>, key: &str) -> String {
    info.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// String entries of the list `info[key]`; non-string entries are dropped.
pub fn string_list(info: &Map<String, Value>, key: &str) -> Vec<String> {
    info.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The `info.requires` list as currently stored on disk.
///
/// Unreadable or oddly shaped documents yield an empty list.
pub fn stored_requires(path: &Path) -> Vec<String> {
    match read_document(path) {
        Ok(document) => info(&document)
            .map(|info| string_list(info, "requires"))
            .unwrap_or_default(),
        Err(e) => {
            tracing::debug!("could not re-read {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Append each of `values` missing from the list `info[key]`, creating the
/// list if needed. Returns how many entries were appended.
pub fn append_unique<I, S>(
    info: &mut Map<String, Value>,
    key: &str,
    values: I,
) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let list = info
        .entry(key)
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| Error::Config(format!("info.{key} is not a list")))?;

    let mut appended = 0;
    for value in values {
        let value = value.into();
        if !list.iter().any(|v| v.as_str() == Some(value.as_str())) {
            list.push(Value::String(value));
            appended += 1;
        }
    }
    Ok(appended)
}
