//! Species catalog record.

use serde::{Deserialize, Serialize};

/// One catalog entry a specimen belongs to.
///
/// The sprite blob is intentionally not part of this record; it is fetched
/// separately through the species repository when a caller exports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    /// Catalog id of the next evolution stage, when one exists.
    pub evolves_into: Option<u32>,
}
