pub mod constants;
pub mod dipole;
