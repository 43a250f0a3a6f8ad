//! CSV scenario loader.
//!
//! # Candidate CSV
//!
//! ```csv
//! id,category,cell_x,cell_y,priority,tags,shape,automation_excluded
//! 0,1,10,12,1,0|2,standard,false
//! 1,1,40,3,2,,single,true
//! ```
//!
//! # Errand CSV
//!
//! ```csv
//! id,category,dest_x,dest_y,priority,tags
//! 0,1,20,20,5,2
//! ```
//!
//! **`tags`** is a `|`-separated list of tag bits (0..64).  Empty means no
//! tags.  **`shape`** is `single` or `standard`; empty means `standard`.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use bg_core::{CandidateId, CategoryId, Cell, ErrandId, Priority, TagSet};

use crate::{Candidate, CandidateIndex, Errand, ErrandBoard, OffsetShape, WorldError, WorldResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CandidateRecord {
    id:                  u32,
    category:            u16,
    cell_x:              i32,
    cell_y:              i32,
    priority:            i32,
    #[serde(default)]
    tags:                String,
    #[serde(default)]
    shape:               String,
    #[serde(default)]
    automation_excluded: bool,
}

#[derive(Deserialize)]
struct ErrandRecord {
    id:       u32,
    category: u16,
    dest_x:   i32,
    dest_y:   i32,
    priority: i32,
    #[serde(default)]
    tags:     String,
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_candidates_csv(path: &Path) -> WorldResult<CandidateIndex> {
    let file = std::fs::File::open(path)?;
    load_candidates_reader(file)
}

/// Like [`load_candidates_csv`] but accepts any `Read` source.
pub fn load_candidates_reader<R: Read>(reader: R) -> WorldResult<CandidateIndex> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut index      = CandidateIndex::new();

    for result in csv_reader.deserialize::<CandidateRecord>() {
        let row   = result.map_err(|e| WorldError::Parse(e.to_string()))?;
        let shape = parse_shape(&row.shape)?;
        let mut candidate = Candidate::new(
            CandidateId(row.id),
            CategoryId(row.category),
            Cell::new(row.cell_x, row.cell_y),
        )
        .with_priority(Priority(row.priority))
        .with_tags(parse_tags(&row.tags)?)
        .with_shape(shape);
        candidate.automation_excluded = row.automation_excluded;
        index.insert(candidate)?;
    }
    Ok(index)
}

pub fn load_errands_csv(path: &Path) -> WorldResult<ErrandBoard> {
    let file = std::fs::File::open(path)?;
    load_errands_reader(file)
}

/// Like [`load_errands_csv`] but accepts any `Read` source.
pub fn load_errands_reader<R: Read>(reader: R) -> WorldResult<ErrandBoard> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut board      = ErrandBoard::new();

    for result in csv_reader.deserialize::<ErrandRecord>() {
        let row = result.map_err(|e| WorldError::Parse(e.to_string()))?;
        let errand = Errand::new(
            ErrandId(row.id),
            CategoryId(row.category),
            Cell::new(row.dest_x, row.dest_y),
        )
        .with_priority(Priority(row.priority))
        .with_tags(parse_tags(&row.tags)?);
        board.insert(errand)?;
    }
    Ok(board)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_tags(s: &str) -> WorldResult<TagSet> {
    let mut tags = TagSet::EMPTY;
    for part in s.split('|').map(str::trim).filter(|p| !p.is_empty()) {
        let bit: u8 = part
            .parse()
            .map_err(|_| WorldError::Parse(format!("invalid tag bit {part:?}")))?;
        if bit >= 64 {
            return Err(WorldError::Parse(format!("tag bit {bit} out of range 0..64")));
        }
        tags = tags.with(bit);
    }
    Ok(tags)
}

fn parse_shape(s: &str) -> WorldResult<OffsetShape> {
    if s.trim().is_empty() {
        return Ok(OffsetShape::default());
    }
    OffsetShape::from_label(s)
        .ok_or_else(|| WorldError::Parse(format!("unknown offset shape {s:?}")))
}
