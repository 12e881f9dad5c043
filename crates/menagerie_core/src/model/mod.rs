//! Domain model for the captured-specimen dataset.
//!
//! # Responsibility
//! - Define canonical record shapes for species, specimens and the two
//!   attack association kinds.
//! - Keep validation of persisted field constraints next to the data.
//!
//! # Invariants
//! - A specimen is identified by its `(species_id, encounter)` key and the
//!   key never changes after capture.
//! - Infection state only moves from healthy to infected.

pub mod attack_links;
pub mod species;
pub mod specimen;
