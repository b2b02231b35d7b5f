//! External-interface collaborators: PNG image I/O and counter CSV
//! export.  The engine itself never touches the filesystem.

pub mod csv;
pub mod png;

pub use csv::write_counters;
pub use png::{load_binary_image, save_binary_image, save_grayscale_image};
