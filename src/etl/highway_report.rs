use std::io::Write;
use std::path::PathBuf;

use log::{info, warn};

use crate::data::HighwaySummary;
use crate::data::osm::Document;
use crate::errors::Result;
use crate::etl::parse_osm;

use super::Etl;

pub const ETL_NAME: &str = "highway_report";

const HIGHWAY_COLUMN_WIDTH: usize = 20;
const COUNT_COLUMN_WIDTH: usize = 8;
const WIDTH_COLUMN_WIDTH: usize = 10;
const SURFACE_COLUMN_WIDTH: usize = 15;
const SEPARATOR_LENGTH: usize = 60;

fn format_row(highway: &str, count: &str, width: &str, surface: &str) -> String {
    format!(
        "{:<hw$} | {:<cw$} | {:<ww$} | {:<sw$}",
        highway, count, width, surface,
        hw = HIGHWAY_COLUMN_WIDTH,
        cw = COUNT_COLUMN_WIDTH,
        ww = WIDTH_COLUMN_WIDTH,
        sw = SURFACE_COLUMN_WIDTH,
    )
}

/// Writes the header, the separator and one row per unique `(width, surface)`
/// pair. The count on each row is the total for the highway value, not for
/// the pair.
pub fn render<W: Write>(summary: &HighwaySummary, out: &mut W) -> Result<()> {
    writeln!(out, "{}", format_row("Highway Value", "Count", "Width", "Surface"))?;
    writeln!(out, "{}", "-".repeat(SEPARATOR_LENGTH))?;

    for (highway, record) in &summary.records {
        let count = record.count.to_string();
        for (width, surface) in &record.combinations {
            writeln!(out, "{}", format_row(highway, &count, width, surface))?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Reads an OSM XML file and writes the highway attribute report to `out`.
pub struct HighwayReportEtl<W: Write> {
    data_path: PathBuf,
    out: W,
}

impl<W: Write> HighwayReportEtl<W> {
    pub fn new(data_path: impl Into<PathBuf>, out: W) -> HighwayReportEtl<W> {
        HighwayReportEtl {
            data_path: data_path.into(),
            out,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Etl for HighwayReportEtl<W> {
    type Input = Document;
    type Output = HighwaySummary;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn extract(&mut self) -> Result<Self::Input> {
        parse_osm::load_document(&self.data_path)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let summary = HighwaySummary::from_document(&input);
        if summary.is_empty() {
            warn!(etl_name = ETL_NAME, root = input.root.name; "No element carries a highway tag");
        }
        info!(
            etl_name = ETL_NAME,
            elements = summary.element_count(),
            highway_values = summary.records.len();
            "Aggregated highway elements"
        );
        Ok(summary)
    }

    fn load(&mut self, output: Self::Output) -> Result<()> {
        render(&output, &mut self.out)
    }
}
