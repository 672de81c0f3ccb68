//! Cluster record writers.

use crate::Result;
use htcc_core::record::ClusterRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column names of the CSV output.
pub const CSV_HEADER: &str =
    "event,nhits,ntheta,nphi,mintheta,maxtheta,minphi,maxphi,nphe,time,theta,phi,dtheta,dphi";

/// Size of one binary cluster record in bytes.
pub const BINARY_RECORD_SIZE: usize = 64;

/// Output encoding, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated text with a header row.
    Csv,
    /// Fixed-size little-endian records.
    Binary,
}

impl OutputFormat {
    /// Format for `path`: `.csv` is CSV, `.bin` and `.dat` are binary.
    ///
    /// Returns `None` for any other extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "bin" | "dat" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// Writer for reconstructed cluster records.
pub struct ClusterFileWriter {
    writer: BufWriter<File>,
}

impl ClusterFileWriter {
    /// Creates a new file writer, truncating any existing file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes one event's clusters as CSV rows.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_clusters_csv(
        &mut self,
        event: u64,
        records: &[ClusterRecord],
        include_header: bool,
    ) -> Result<()> {
        if include_header {
            writeln!(self.writer, "{CSV_HEADER}")?;
        }

        for r in records {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                event,
                r.n_hits,
                r.n_theta,
                r.n_phi,
                r.theta_min,
                r.theta_max,
                r.phi_min,
                r.phi_max,
                r.nphe,
                r.time,
                r.theta,
                r.phi,
                r.dtheta,
                r.dphi
            )?;
        }
        Ok(())
    }

    /// Writes one event's clusters as binary records.
    ///
    /// Format per cluster: u64 (event) + u16 (nhits) + 6 x u8 (ntheta, nphi,
    /// mintheta, maxtheta, minphi, maxphi) + u64 (nphe) + 5 x f64 (time,
    /// theta, phi, dtheta, dphi), little-endian.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_clusters_binary(&mut self, event: u64, records: &[ClusterRecord]) -> Result<()> {
        for r in records {
            self.writer.write_all(&event.to_le_bytes())?;
            self.writer.write_all(&r.n_hits.to_le_bytes())?;
            self.writer.write_all(&[
                r.n_theta,
                r.n_phi,
                r.theta_min,
                r.theta_max,
                r.phi_min,
                r.phi_max,
            ])?;
            self.writer.write_all(&r.nphe.to_le_bytes())?;
            for value in [r.time, r.theta, r.phi, r.dtheta, r.dphi] {
                self.writer.write_all(&value.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Writes one event's clusters in `format`.
    ///
    /// `include_header` only applies to CSV.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_clusters(
        &mut self,
        format: OutputFormat,
        event: u64,
        records: &[ClusterRecord],
        include_header: bool,
    ) -> Result<()> {
        match format {
            OutputFormat::Csv => self.write_clusters_csv(event, records, include_header),
            OutputFormat::Binary => self.write_clusters_binary(event, records),
        }
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if the buffered data cannot be written.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
