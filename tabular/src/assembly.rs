//! Raw source ingestion: delimiter-aware CSV reading, repair of known
//! source defects, numeric coercion, provenance tagging, and the
//! row-wise merge into one normalized frame.

use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Result, TabularError};
use crate::frame::{Column, Frame};

/// Columns declared numeric by the survey schema. Cells in these
/// columns that fail to parse become missing markers, never load
/// failures.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "age",
    "Medu",
    "Fedu",
    "traveltime",
    "studytime",
    "failures",
    "famrel",
    "freetime",
    "goout",
    "Dalc",
    "Walc",
    "health",
    "absences",
    "G1",
    "G2",
    "G3",
];

/// Name of the provenance column stamped on every assembled row.
pub const SUBJECT_COLUMN: &str = "subject";

/// A column whose header carries more comma fragments than this is a
/// collapsed merge of many columns and gets dropped during repair.
const MERGED_NAME_FRAGMENTS: usize = 3;

/// One delimited input file and how to read it.
#[derive(Debug, Clone)]
pub struct Source<'a> {
    pub path: &'a Path,
    pub delimiter: u8,
    /// Provenance tag written into the [`SUBJECT_COLUMN`] of every row.
    pub subject: &'a str,
}

/// Loads every source, repairs it, stacks the rows, and drops exact
/// duplicates.
///
/// # Errors
/// Fails on unreadable files and on sources that disagree on the
/// post-repair column set. Cell-level defects are repaired in place,
/// not propagated.
pub fn assemble(sources: &[Source<'_>]) -> Result<Frame> {
    let mut frames = Vec::with_capacity(sources.len());
    for source in sources {
        let frame = load_source(source)?;
        info!(
            "loaded {} rows x {} columns from {} (subject={})",
            frame.height(),
            frame.width(),
            source.path.display(),
            source.subject,
        );
        frames.push(frame);
    }
    let mut merged = Frame::concat(frames)?;
    let dropped = merged.dedup_rows();
    if dropped > 0 {
        debug!("dropped {dropped} duplicate rows");
    }
    info!(
        "assembled frame: {} rows x {} columns",
        merged.height(),
        merged.width()
    );
    Ok(merged)
}

/// Reads one delimited file into a typed frame, applying the repair
/// pass for the known source defects: re-embedded header rows,
/// collapsed merged columns, and unparsable numeric cells.
pub fn load_source(source: &Source<'_>) -> Result<Frame> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(source.delimiter)
        .flexible(true)
        .from_path(source.path)?;

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut header_dupes = 0usize;
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        if row == header {
            header_dupes += 1;
            continue;
        }
        // Ragged rows are padded with empty cells so the numeric
        // coercion below turns the holes into missing markers.
        row.resize(header.len(), String::new());
        rows.push(row);
    }
    if header_dupes > 0 {
        warn!(
            "{}: discarded {header_dupes} re-embedded header rows",
            source.path.display()
        );
    }

    let kept: Vec<usize> = (0..header.len())
        .filter(|&i| {
            let fragments = header[i].matches(',').count();
            if fragments > MERGED_NAME_FRAGMENTS {
                warn!(
                    "{}: dropping merged column '{}'",
                    source.path.display(),
                    header[i]
                );
                false
            } else {
                true
            }
        })
        .collect();

    let mut names = Vec::with_capacity(kept.len() + 1);
    let mut cols = Vec::with_capacity(kept.len() + 1);
    for &i in &kept {
        let name = header[i].clone();
        let col = if NUMERIC_COLUMNS.contains(&name.as_str()) {
            Column::Numeric(rows.iter().map(|r| parse_numeric(&r[i])).collect())
        } else {
            Column::Text(rows.iter().map(|r| r[i].clone()).collect())
        };
        names.push(name);
        cols.push(col);
    }

    names.push(SUBJECT_COLUMN.to_string());
    cols.push(Column::Text(vec![source.subject.to_string(); rows.len()]));

    Ok(Frame::new(names, cols))
}

fn parse_numeric(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    // non-finite cells count as missing, like any other unparsable value
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}
