use super::bus::BusEvent;
use serde::{Deserialize, Serialize};

/// Raised after an ingestion run finished and the knowledge graph changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDataUpdated {
    pub entities_extracted: u64,
    pub relations_extracted: u64,
}

impl BusEvent for GraphDataUpdated {
    const NAME: &'static str = "graph-data-updated";
}
