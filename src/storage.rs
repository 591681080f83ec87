use crate::models::{Sample, CANONICAL_COLUMNS};
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Year threshold used by the offline split interface: samples up to 2014
/// go to the "older" file, 2015 onward to the "recent" file.
pub const SPLIT_YEAR: i32 = 2014;

fn write_rows<W: std::io::Write>(wtr: &mut csv::Writer<W>, samples: &[Sample]) -> Result<()> {
    wtr.serialize(CANONICAL_COLUMNS)?;
    for s in samples {
        wtr.serialize((
            &s.sample_id,
            s.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            &s.site_name,
            &s.site_id,
            &s.fuel_type,
            &s.category,
            &s.sub_category,
            &s.method,
            s.value,
            &s.status,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save samples as CSV with the canonical header.
pub fn save_csv<P: AsRef<Path>>(samples: &[Sample], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    write_rows(&mut wtr, samples)
}

/// Save samples as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(samples: &[Sample], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(samples)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Partition samples at the [`SPLIT_YEAR`] threshold and write both split
/// files with canonical columns only (no helper year column).
pub fn save_split<P: AsRef<Path>, Q: AsRef<Path>>(samples: &[Sample], older: P, recent: Q) -> Result<()> {
    let (old_rows, new_rows): (Vec<Sample>, Vec<Sample>) = samples
        .iter()
        .cloned()
        .partition(|s| s.year() <= SPLIT_YEAR);
    save_csv(&old_rows, older)?;
    save_csv(&new_rows, recent)?;
    Ok(())
}
