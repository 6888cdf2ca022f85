pub mod dipole;
