//! Foundation layer: data models, physics, and file formats.
//!
//! Nothing in this module is concurrent or stateful. The [`models::dipole::PointStore`] is
//! loaded once by [`io::dipole_file`] and then shared read-only by every pipeline task, while
//! [`physics`] provides the pure per-pair energy function the workers evaluate.

pub mod io;
pub mod models;
pub mod physics;
