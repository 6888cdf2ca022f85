//! # Dipolar Core Library
//!
//! Computes the total magnetic dipole–dipole interaction energy of a set of point dipoles
//! by evaluating every unique unordered pair exactly and summing the terms.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`PointStore`), the closed-form
//!   pair interaction and its physical constants, and I/O for the input and report formats.
//!
//! - **[`engine`]: The Logic Core.** The concurrent machinery: a single pair producer, a
//!   bounded pool of energy workers, and a fixed-count result aggregator, coordinated through
//!   bounded queues, one atomic sequence counter and a shared shutdown signal.
//!
//! - **[`workflows`]: The Public API.** The [`workflows::total_energy::Coordinator`] wires the
//!   engine together and runs one complete evaluation with an orderly shutdown.

pub mod core;
pub mod engine;
pub mod workflows;
