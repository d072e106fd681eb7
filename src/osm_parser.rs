use crate::element::{ElementKind, ElementRef, Member, Node, OsmResult, Relation, Way};
use crate::error::Result;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Raw data from Overpass

#[derive(Debug, Deserialize)]
struct OsmMember {
    r#type: String,
    r#ref: u64,
    #[serde(default)]
    role: String,
}

#[derive(Debug, Deserialize)]
struct OsmElement {
    pub r#type: String,
    pub id: u64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub nodes: Option<Vec<u64>>,
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub members: Vec<OsmMember>,
}

/// Top-level `[out:json]` document. `version`, `generator` and `osm3s`
/// are not needed and get ignored.
#[derive(Deserialize)]
struct OsmData {
    #[serde(default)]
    pub elements: Vec<OsmElement>,
}

struct SplitOsmData {
    pub nodes: Vec<OsmElement>,
    pub ways: Vec<OsmElement>,
    pub relations: Vec<OsmElement>,
    pub others: Vec<OsmElement>,
}

impl SplitOsmData {
    fn from_raw_osm_data(osm_data: OsmData) -> Self {
        let mut nodes = Vec::new();
        let mut ways = Vec::new();
        let mut relations = Vec::new();
        let mut others = Vec::new();
        for element in osm_data.elements {
            match ElementKind::from_osm_type(&element.r#type) {
                Some(ElementKind::Node) => nodes.push(element),
                Some(ElementKind::Way) => ways.push(element),
                Some(ElementKind::Relation) => relations.push(element),
                None => others.push(element),
            }
        }
        SplitOsmData {
            nodes,
            ways,
            relations,
            others,
        }
    }
}

// End raw data

/// Builds an [`OsmResult`] from a parsed Overpass JSON value.
pub fn parse_osm_data(json_data: Value) -> Result<OsmResult> {
    let osm_data: OsmData = serde_json::from_value(json_data)?;
    Ok(build_result(osm_data))
}

fn build_result(osm_data: OsmData) -> OsmResult {
    let data = SplitOsmData::from_raw_osm_data(osm_data);
    let mut result = OsmResult::new();

    for element in &data.others {
        debug!(
            "Skipping element {} of unsupported type \"{}\"",
            element.id, element.r#type
        );
    }

    for element in data.nodes {
        let (Some(lat), Some(lon)) = (element.lat, element.lon) else {
            warn!("Skipping node {} without coordinates", element.id);
            continue;
        };
        result.insert_node(Node {
            id: element.id,
            lon,
            lat,
            tags: element.tags.unwrap_or_default(),
        });
    }

    for element in data.ways {
        result.insert_way(Way {
            id: element.id,
            node_ids: element.nodes.unwrap_or_default(),
            tags: element.tags.unwrap_or_default(),
        });
    }

    for element in data.relations {
        let members: Vec<Member> = element
            .members
            .iter()
            .filter_map(|mem: &OsmMember| {
                let Some(kind) = ElementKind::from_osm_type(&mem.r#type) else {
                    warn!(
                        "Relation {}: unknown member type \"{}\"",
                        element.id, mem.r#type
                    );
                    return None;
                };
                Some(Member::new(
                    ElementRef::new(kind, mem.r#ref),
                    mem.role.as_str(),
                ))
            })
            .collect();

        result.insert_relation(Relation {
            id: element.id,
            members,
            tags: element.tags.unwrap_or_default(),
        });
    }

    debug!(
        "Parsed {} nodes, {} ways, {} relations",
        result.node_ids().len(),
        result.way_ids().len(),
        result.relation_ids().len()
    );

    result
}

impl OsmResult {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let osm_data: OsmData = serde_json::from_str(json)?;
        Ok(build_result(osm_data))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_reader(reader);
        let osm_data: OsmData = OsmData::deserialize(&mut deserializer)?;
        Ok(build_result(osm_data))
    }
}

/// Loads a saved Overpass JSON result from disk.
pub fn load_osm_file<P: AsRef<Path>>(path: P) -> Result<OsmResult> {
    let file: File = File::open(path)?;
    let reader: BufReader<File> = BufReader::new(file);
    OsmResult::from_reader(reader)
}
