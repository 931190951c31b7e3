// src/parser/tables/io.rs
use std::{
    io::{BufWriter, Write},
    path::Path,
};

use super::ParseTable;

pub fn save_parse_tables_json(path: &Path, t: &ParseTable) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, t)?;
    w.flush()
}

pub fn load_parse_tables_json_bytes(data: &[u8]) -> Result<ParseTable, String> {
    let t: ParseTable = serde_json::from_slice(data)
        .map_err(|e| format!("Failed to parse parse tables JSON: {e}"))?;
    let width = t.eof as usize + 1;
    if let Some(row) = t.action.iter().position(|r| r.len() != width) {
        return Err(format!("action row {row} has the wrong width (expected {width})"));
    }
    if t.goto.len() != t.action.len() {
        return Err("goto and action tables disagree on the state count".into());
    }
    Ok(t)
}
