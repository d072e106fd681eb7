//! Overshape turns the elements of an Overpass API result into GeoJSON
//! features.
//!
//! Nodes become points and ways become lines or ring polygons. Relations
//! are the interesting part: their inner/outer member ways are chained into
//! closed rings, unioned per role and the inner area is cut out of the
//! outer one.
//!
//! ```no_run
//! use overshape::{load_osm_file, OverpassConverter};
//!
//! let result = load_osm_file("lake.json")?;
//! let feature = OverpassConverter::new(&result).relation_feature(None)?;
//! println!("{}", serde_json::to_string(&feature.export())?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod args;
pub mod converter;
pub mod element;
pub mod error;
pub mod feature;
pub mod osm_parser;
pub mod polygonize;
pub mod relation_geometry;
pub mod resolver;
#[cfg(test)]
mod test_utilities;
pub mod way_geometry;

pub use args::{validate_args, Args};
pub use converter::OverpassConverter;
pub use element::{Element, ElementKind, ElementRef, Member, MemberRole, Node, OsmId, OsmResult, Relation, Tags, Way};
pub use error::{ConvertError, Result};
pub use feature::Feature;
pub use osm_parser::{load_osm_file, parse_osm_data};
pub use relation_geometry::{AssemblyMode, RelationAssembler};
pub use resolver::Resolver;
