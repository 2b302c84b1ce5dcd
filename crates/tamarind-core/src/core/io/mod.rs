//! Local file handling for the files exchanged with the service.
//!
//! - [`format`] classifies structure files (PDB, mmCIF, gzip) before they are uploaded.
//! - [`archive`] unpacks result archives.
//! - [`table`] reads, reshapes and writes the CSV metrics tables produced by the models.

pub mod archive;
pub mod format;
pub mod table;
