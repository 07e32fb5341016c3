//! BOM normalization.
//!
//! Exporters disagree on column names, so the generated CSV is rewritten in
//! place into the schema the asset service ingests: canonical header names,
//! the required columns present, every field quoted, and the quantity column
//! holding a positive integer. Running the rewrite on its own output changes
//! nothing.

use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

pub const REQUIRED_COLUMNS: [&str; 3] = ["Reference", "MPN", "QUANTITY"];

const REFERENCE_NAMES: [&str; 7] = ["ref", "reference", "designator", "find", "f/n", "find no", "parts"];
const MPN_NAMES: [&str; 6] = ["value", "part number", "p/n", "part no", "pn", "mpn"];
const QUANTITY_NAMES: [&str; 3] = ["quantity", "qty", "amount"];
const DNP_NAMES: [&str; 4] = ["dnp", "dn", "do not mount", "dnm"];

/// Rewrite the CSV at `path` into the canonical schema.
pub fn normalize_in_place(path: &Path) -> Result<()> {
    let raw = io::read_file(path, "read bom")?;
    let normalized = normalize_content(&raw)
        .map_err(|e| Error::bom_normalize_failed(path.display().to_string(), e.message))?;
    io::write_file_atomic(path, &normalized, "write bom")
}

/// Pure normalization of CSV text.
pub fn normalize_content(input: &str) -> Result<String> {
    let mut lines = input.lines().filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| Error::bom_normalize_failed("<content>", "file is empty"))?;

    let mut header: Vec<String> = split_fields(header_line)
        .iter()
        .map(|name| canonical_column(name))
        .collect();

    for required in REQUIRED_COLUMNS {
        if !header.iter().any(|name| name == required) {
            header.push(required.to_string());
        }
    }

    let quantity_index = header
        .iter()
        .position(|name| name == "QUANTITY")
        .unwrap_or(header.len());

    let mut output: Vec<String> = Vec::new();
    output.push(write_row(&header));

    for line in lines {
        let mut fields = split_fields(line);
        if fields.len() < header.len() {
            fields.resize(header.len(), String::new());
        }
        if let Some(raw) = fields.get_mut(quantity_index) {
            *raw = coerce_quantity(raw).to_string();
        }
        output.push(write_row(&fields));
    }

    Ok(output.join("\n"))
}

/// Map one header name onto the canonical schema. Unknown names pass
/// through unchanged.
fn canonical_column(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    if REFERENCE_NAMES.contains(&lowered.as_str()) {
        "Reference".to_string()
    } else if MPN_NAMES.contains(&lowered.as_str()) {
        "MPN".to_string()
    } else if QUANTITY_NAMES.contains(&lowered.as_str()) {
        "QUANTITY".to_string()
    } else if DNP_NAMES.contains(&lowered.as_str()) {
        "DNP".to_string()
    } else {
        name.trim().to_string()
    }
}

/// A quantity is a positive integer; anything else falls back to 1.
fn coerce_quantity(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 1 => value,
        _ => 1,
    }
}

/// Split one CSV line, honoring double quotes. A doubled quote inside a
/// quoted field reads as a literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current).trim().to_string());
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn write_row(fields: &[String]) -> String {
    let quoted: Vec<String> = fields
        .iter()
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect();
    quoted.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn maps_synonyms_onto_the_canonical_header() {
        let input = "Designator,Value,Qty,Do not mount\nR1,10k,2,no";
        let output = normalize_content(input).unwrap();
        let header = output.lines().next().unwrap();
        assert_eq!(header, "\"Reference\",\"MPN\",\"QUANTITY\",\"DNP\"");
    }

    #[test]
    fn appends_missing_required_columns() {
        let input = "Reference,Footprint\nR1,0402";
        let output = normalize_content(input).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"Reference\",\"Footprint\",\"MPN\",\"QUANTITY\""
        );
        // padded MPN cell stays empty, padded quantity becomes 1
        assert_eq!(lines.next().unwrap(), "\"R1\",\"0402\",\"\",\"1\"");
    }

    #[test]
    fn quantity_is_coerced_to_a_positive_integer() {
        let input = "Reference,MPN,QUANTITY\nR1,X,4\nR2,X,\nR3,X,abc\nR4,X,0\nR5,X,-3";
        let output = normalize_content(input).unwrap();
        let quantities: Vec<&str> = output
            .lines()
            .skip(1)
            .map(|line| line.rsplit(',').next().unwrap())
            .collect();
        assert_eq!(quantities, ["\"4\"", "\"1\"", "\"1\"", "\"1\"", "\"1\""]);
    }

    #[test]
    fn quoted_commas_survive() {
        let input = "Reference,MPN,QUANTITY\nR1,\"RES,0402\",2";
        let output = normalize_content(input).unwrap();
        assert!(output.lines().nth(1).unwrap().contains("\"RES,0402\""));
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "Designator,Value,Qty\nR1,10k,2\nC1,\"CAP, 100n\",",
            "Reference,Footprint\nR1,0402",
            "ref,pn,amount,dnm,Notes\nR1,X,3,no,\"hand, solder\"",
        ];
        for input in inputs {
            let once = normalize_content(input).unwrap();
            let twice = normalize_content(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn unknown_headers_pass_through() {
        let input = "Reference,MPN,QUANTITY,Notes\nR1,X,1,check this";
        let output = normalize_content(input).unwrap();
        assert!(output.lines().next().unwrap().contains("\"Notes\""));
    }

    #[test]
    fn empty_file_is_an_error() {
        let err = normalize_content("").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::BomNormalizeFailed);
    }

    #[test]
    fn blank_lines_are_dropped() {
        let input = "Reference,MPN,QUANTITY\n\nR1,X,1\n\n";
        let output = normalize_content(input).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn rewrites_the_file_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bom.csv");
        std::fs::write(&path, "Designator,Value,Qty\nR1,10k,2").unwrap();

        normalize_in_place(&path).unwrap();

        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(rewritten.starts_with("\"Reference\",\"MPN\",\"QUANTITY\""));
    }

    #[test]
    fn escaped_quotes_round_trip() {
        let input = "Reference,MPN,QUANTITY\nR1,\"1\"\" resistor\",2";
        let once = normalize_content(input).unwrap();
        assert!(once.contains("\"1\"\" resistor\""));
        let twice = normalize_content(&once).unwrap();
        assert_eq!(once, twice);
    }
}
