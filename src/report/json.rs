use anyhow::Result;

use crate::models::Classification;

pub fn to_json(rows: &[Classification]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

pub fn render(rows: &[Classification]) -> Result<()> {
    println!("{}", to_json(rows)?);
    Ok(())
}
