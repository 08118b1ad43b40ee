// Exporter module: turns finalized offers into a table and writes it out.

pub mod table;
pub mod csv_file;

pub use csv_file::write_table;
pub use table::{serialize, ExportTable};
