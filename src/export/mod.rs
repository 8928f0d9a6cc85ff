//! Output of parsed tables: the CSV itself and optional debug artifacts.

pub mod csv_writer;
pub mod debug;

pub use csv_writer::write_csv;
pub use debug::{print_preview, write_debug_artifacts};
