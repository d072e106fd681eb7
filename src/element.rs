use crate::error::{ConvertError, Result};
use clap::ValueEnum;
use fnv::FnvHashMap;
use geo::Coord;
use std::collections::HashMap;
use std::fmt;

pub type OsmId = u64;
pub type Tags = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        }
    }

    /// Parses the `type` string used by Overpass for elements and members.
    pub fn from_osm_type(value: &str) -> Option<Self> {
        match value {
            "node" => Some(ElementKind::Node),
            "way" => Some(ElementKind::Way),
            "relation" => Some(ElementKind::Relation),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed pointer to an element of the result, e.g. `way/42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: OsmId,
}

impl ElementRef {
    pub fn new(kind: ElementKind, id: OsmId) -> Self {
        Self { kind, id }
    }

    pub fn node(id: OsmId) -> Self {
        Self::new(ElementKind::Node, id)
    }

    pub fn way(id: OsmId) -> Self {
        Self::new(ElementKind::Way, id)
    }

    pub fn relation(id: OsmId) -> Self {
        Self::new(ElementKind::Relation, id)
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: OsmId,
    pub lon: f64,
    pub lat: f64,
    pub tags: Tags,
}

impl Node {
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: OsmId,
    pub node_ids: Vec<OsmId>,
    pub tags: Tags,
}

impl Way {
    /// A way is closed when it starts and ends on the same node id.
    /// Two distinct nodes sharing a position do not close it.
    pub fn is_closed(&self) -> bool {
        match (self.node_ids.first(), self.node_ids.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRole {
    Outer,
    Inner,
    Other(String),
}

impl MemberRole {
    pub fn as_str(&self) -> &str {
        match self {
            MemberRole::Outer => "outer",
            MemberRole::Inner => "inner",
            MemberRole::Other(role) => role,
        }
    }
}

impl From<&str> for MemberRole {
    fn from(value: &str) -> Self {
        match value {
            "outer" => MemberRole::Outer,
            "inner" => MemberRole::Inner,
            other => MemberRole::Other(other.to_string()),
        }
    }
}

impl From<String> for MemberRole {
    fn from(value: String) -> Self {
        MemberRole::from(value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub target: ElementRef,
    pub role: MemberRole,
}

impl Member {
    pub fn new(target: ElementRef, role: impl Into<MemberRole>) -> Self {
        Self {
            target,
            role: role.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    pub members: Vec<Member>,
    pub tags: Tags,
}

/// A resolved element borrowed from an [`OsmResult`].
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    Node(&'a Node),
    Way(&'a Way),
    Relation(&'a Relation),
}

impl<'a> Element<'a> {
    pub fn tags(&self) -> &'a Tags {
        match self {
            Element::Node(n) => &n.tags,
            Element::Way(w) => &w.tags,
            Element::Relation(r) => &r.tags,
        }
    }

    pub fn id(&self) -> OsmId {
        match self {
            Element::Node(n) => n.id,
            Element::Way(w) => w.id,
            Element::Relation(r) => r.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Node(_) => ElementKind::Node,
            Element::Way(_) => ElementKind::Way,
            Element::Relation(_) => ElementKind::Relation,
        }
    }

    pub fn reference(&self) -> ElementRef {
        ElementRef::new(self.kind(), self.id())
    }
}

/// All elements of one Overpass result. Id lists keep input order.
#[derive(Debug, Clone, Default)]
pub struct OsmResult {
    nodes: FnvHashMap<OsmId, Node>,
    ways: FnvHashMap<OsmId, Way>,
    relations: FnvHashMap<OsmId, Relation>,
    node_ids: Vec<OsmId>,
    way_ids: Vec<OsmId>,
    relation_ids: Vec<OsmId>,
}

impl OsmResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, node: Node) {
        let id = node.id;
        if self.nodes.insert(id, node).is_none() {
            self.node_ids.push(id);
        }
    }

    pub fn insert_way(&mut self, way: Way) {
        let id = way.id;
        if self.ways.insert(id, way).is_none() {
            self.way_ids.push(id);
        }
    }

    pub fn insert_relation(&mut self, relation: Relation) {
        let id = relation.id;
        if self.relations.insert(id, relation).is_none() {
            self.relation_ids.push(id);
        }
    }

    pub fn get_node(&self, id: OsmId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(ConvertError::NotFound {
            reference: ElementRef::node(id),
        })
    }

    pub fn get_way(&self, id: OsmId) -> Result<&Way> {
        self.ways.get(&id).ok_or(ConvertError::NotFound {
            reference: ElementRef::way(id),
        })
    }

    pub fn get_relation(&self, id: OsmId) -> Result<&Relation> {
        self.relations.get(&id).ok_or(ConvertError::NotFound {
            reference: ElementRef::relation(id),
        })
    }

    pub fn node_ids(&self) -> &[OsmId] {
        &self.node_ids
    }

    pub fn way_ids(&self) -> &[OsmId] {
        &self.way_ids
    }

    pub fn relation_ids(&self) -> &[OsmId] {
        &self.relation_ids
    }

    pub fn ids(&self, kind: ElementKind) -> &[OsmId] {
        match kind {
            ElementKind::Node => self.node_ids(),
            ElementKind::Way => self.way_ids(),
            ElementKind::Relation => self.relation_ids(),
        }
    }

    pub fn total_count(&self) -> usize {
        self.node_ids.len() + self.way_ids.len() + self.relation_ids.len()
    }
}
