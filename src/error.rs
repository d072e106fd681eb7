use crate::element::{ElementKind, ElementRef, OsmId};
use crate::polygonize::Dangling;
use crate::relation_geometry::{AssemblyMode, Bucket};
use itertools::Itertools;
use thiserror::Error;

/// Result type for element conversion
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while turning OSM elements into features
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No {kind} in result")]
    NoCandidate { kind: ElementKind },

    #[error("Expected at most one {kind}, got: {}", .ids.iter().join(", "))]
    AmbiguousSelection { kind: ElementKind, ids: Vec<OsmId> },

    #[error("{reference} not found in result")]
    NotFound { reference: ElementRef },

    #[error(
        "Cyclic reference: relation {relation} is reached again via {}",
        .path.iter().map(|id| format!("relation/{id}")).join(" -> ")
    )]
    CyclicReference { relation: OsmId, path: Vec<OsmId> },

    #[error("Way {way} has {nodes} node(s), at least 2 are needed for a geometry")]
    InsufficientGeometry { way: OsmId, nodes: usize },

    #[error("Relation {relation}: {bucket} rings do not close, {dangling}")]
    RingAssembly {
        relation: OsmId,
        bucket: Bucket,
        dangling: Dangling,
    },

    #[error("Tag {key:?} is not set")]
    MissingTag { key: String },

    #[error("Relation {relation}: member {member} cannot be converted in {mode} mode")]
    UnsupportedMemberType {
        relation: OsmId,
        member: ElementRef,
        mode: AssemblyMode,
    },

    #[error("Invalid GeoJSON feature: {reason}")]
    InvalidGeoJson { reason: String },

    #[error("Failed to parse Overpass JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
