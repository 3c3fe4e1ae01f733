//! Reading postings handed over by the search provider.
//!
//! Accepted shapes: a single posting object, an array of postings, or a
//! search response carrying a `jobs_results` array.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::models::JobPosting;

pub fn parse_postings(raw: &str) -> Result<Vec<JobPosting>> {
    let value: Value = serde_json::from_str(raw).context("Input is not valid JSON")?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("jobs_results") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(anyhow!("'jobs_results' must be an array")),
            None => vec![Value::Object(obj)],
        },
        _ => return Err(anyhow!("Expected a job posting object or a list of postings")),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .with_context(|| format!("Posting #{} is not a job posting object", i))
        })
        .collect()
}

/// Picks the postings to save: all of them, or only the one at `index`.
pub fn select(postings: Vec<JobPosting>, index: Option<usize>) -> Result<Vec<JobPosting>> {
    match index {
        None => Ok(postings),
        Some(i) => {
            let len = postings.len();
            postings
                .into_iter()
                .nth(i)
                .map(|p| vec![p])
                .ok_or_else(|| anyhow!("Index {} out of range ({} postings)", i, len))
        }
    }
}
