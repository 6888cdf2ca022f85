pub mod dipole_file;
pub mod report;
pub mod traits;
