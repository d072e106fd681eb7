//! Relation geometry assembly.
//!
//! A multipolygon relation lists its boundary as an unordered bag of member
//! ways, each tagged `outer` or `inner` and each possibly only a piece of a
//! ring. Assembly polygonizes every role bucket, unions the rings per bucket
//! and cuts the inner area out of the outer one.

use crate::element::{Element, ElementRef, Member, MemberRole, OsmId, Relation};
use crate::error::{ConvertError, Result};
use crate::polygonize::polygonize;
use crate::resolver::Resolver;
use crate::way_geometry::way_line;
use clap::ValueEnum;
use fnv::FnvHashMap;
use geo::{BooleanOps, Geometry, LineString, MultiLineString, MultiPolygon, Polygon};
use log::debug;
use std::fmt;

/// What a relation is assembled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AssemblyMode {
    /// One area with holes, rebuilt from inner/outer rings
    #[default]
    Polygon,
    /// Every member's line as-is, for routes and boundary collections
    #[value(name = "lines")]
    LineSoup,
}

impl fmt::Display for AssemblyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyMode::Polygon => f.write_str("polygon"),
            AssemblyMode::LineSoup => f.write_str("lines"),
        }
    }
}

/// The member set a ring was assembled from, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Outer,
    Inner,
    /// No member had a role, so everything counted as outer
    All,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Outer => f.write_str("outer"),
            Bucket::Inner => f.write_str("inner"),
            Bucket::All => f.write_str("all"),
        }
    }
}

#[derive(Debug, Default)]
struct RoleBuckets<'a> {
    outer: Vec<&'a Member>,
    inner: Vec<&'a Member>,
    unclassified: Vec<&'a Member>,
}

impl<'a> RoleBuckets<'a> {
    fn partition(relation: &'a Relation) -> Self {
        let mut buckets = RoleBuckets::default();
        for member in &relation.members {
            match member.role {
                MemberRole::Outer => buckets.outer.push(member),
                MemberRole::Inner => buckets.inner.push(member),
                MemberRole::Other(_) => buckets.unclassified.push(member),
            }
        }
        buckets
    }

    fn has_roles(&self) -> bool {
        !self.outer.is_empty() || !self.inner.is_empty()
    }
}

/// Members that take part in assembling `relation` in the given mode.
fn consumed_members(relation: &Relation, mode: AssemblyMode) -> Vec<&Member> {
    match mode {
        AssemblyMode::LineSoup => relation.members.iter().collect(),
        AssemblyMode::Polygon => {
            let buckets = RoleBuckets::partition(relation);
            if buckets.has_roles() {
                buckets.outer.into_iter().chain(buckets.inner).collect()
            } else {
                buckets.unclassified
            }
        }
    }
}

/// Every part goes through the union, a single one included, so rings come
/// out valid and with the same orientation whatever the input had.
fn union_all(parts: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    parts
        .into_iter()
        .fold(MultiPolygon::new(vec![]), |acc, part| {
            acc.union(&MultiPolygon::new(vec![part]))
        })
}

/// Single-part areas come out as a plain polygon.
fn area_geometry(mut area: MultiPolygon<f64>) -> Geometry<f64> {
    if area.0.len() == 1 {
        if let Some(polygon) = area.0.pop() {
            return Geometry::Polygon(polygon);
        }
    }
    Geometry::MultiPolygon(area)
}

fn missing_relation(id: OsmId) -> ConvertError {
    ConvertError::NotFound {
        reference: ElementRef::relation(id),
    }
}

pub struct RelationAssembler<'a> {
    resolver: Resolver<'a>,
}

impl<'a> RelationAssembler<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn assemble(&self, relation: &'a Relation, mode: AssemblyMode) -> Result<Geometry<f64>> {
        match mode {
            AssemblyMode::Polygon => self.area(relation).map(area_geometry),
            AssemblyMode::LineSoup => self.line_soup(relation).map(Geometry::MultiLineString),
        }
    }

    /// Area covered by `relation`: `union(outer) - union(inner)`, or the
    /// union of all members when none carries an inner/outer role.
    ///
    /// Nested relations are assembled before their parents and reused, so a
    /// relation shared by several parents is only built once per call.
    pub fn area(&self, relation: &'a Relation) -> Result<MultiPolygon<f64>> {
        let order = self
            .resolver
            .relation_order(relation, |r| consumed_members(r, AssemblyMode::Polygon))?;

        let mut areas: FnvHashMap<OsmId, MultiPolygon<f64>> = FnvHashMap::default();
        for current in order {
            let area = self.relation_area(current, &areas)?;
            areas.insert(current.id, area);
        }

        areas
            .remove(&relation.id)
            .ok_or_else(|| missing_relation(relation.id))
    }

    fn relation_area(
        &self,
        relation: &'a Relation,
        areas: &FnvHashMap<OsmId, MultiPolygon<f64>>,
    ) -> Result<MultiPolygon<f64>> {
        let buckets = RoleBuckets::partition(relation);

        if !buckets.has_roles() {
            // Many relations carry no roles at all and still describe a
            // plain boundary, so everything counts as outer
            return self.bucket_area(relation, Bucket::All, &buckets.unclassified, areas);
        }

        for member in &buckets.unclassified {
            debug!(
                "Relation {}: ignoring {} with role {:?}",
                relation.id,
                member.target,
                member.role.as_str()
            );
        }

        let outer = self.bucket_area(relation, Bucket::Outer, &buckets.outer, areas)?;
        let inner = self.bucket_area(relation, Bucket::Inner, &buckets.inner, areas)?;

        if inner.0.is_empty() {
            Ok(outer)
        } else {
            Ok(outer.difference(&inner))
        }
    }

    fn bucket_area(
        &self,
        relation: &Relation,
        bucket: Bucket,
        members: &[&'a Member],
        areas: &FnvHashMap<OsmId, MultiPolygon<f64>>,
    ) -> Result<MultiPolygon<f64>> {
        let mut fragments: Vec<LineString<f64>> = Vec::new();
        let mut parts: Vec<Polygon<f64>> = Vec::new();

        for member in members {
            match self.resolver.resolve_member(member)? {
                Element::Way(way) => fragments.push(way_line(&self.resolver, way)?.line),
                Element::Relation(nested) => {
                    let area = areas
                        .get(&nested.id)
                        .ok_or_else(|| missing_relation(nested.id))?;
                    parts.extend(area.0.iter().cloned());
                }
                Element::Node(_) => {
                    return Err(ConvertError::UnsupportedMemberType {
                        relation: relation.id,
                        member: member.target,
                        mode: AssemblyMode::Polygon,
                    })
                }
            }
        }

        let rings = polygonize(fragments).map_err(|dangling| ConvertError::RingAssembly {
            relation: relation.id,
            bucket,
            dangling,
        })?;

        debug!(
            "Relation {} ({bucket}): {} ring(s), {} nested part(s)",
            relation.id,
            rings.len(),
            parts.len()
        );
        parts.extend(rings);
        Ok(union_all(parts))
    }

    /// Raw lines of every member, nested relations flattened in place.
    pub fn line_soup(&self, relation: &'a Relation) -> Result<MultiLineString<f64>> {
        let order = self
            .resolver
            .relation_order(relation, |r| consumed_members(r, AssemblyMode::LineSoup))?;

        let mut soups: FnvHashMap<OsmId, Vec<LineString<f64>>> = FnvHashMap::default();
        for current in order {
            let mut lines: Vec<LineString<f64>> = Vec::new();
            for member in &current.members {
                match self.resolver.resolve_member(member)? {
                    Element::Way(way) => lines.push(way_line(&self.resolver, way)?.line),
                    Element::Relation(nested) => {
                        let nested_lines = soups
                            .get(&nested.id)
                            .ok_or_else(|| missing_relation(nested.id))?;
                        lines.extend(nested_lines.iter().cloned());
                    }
                    Element::Node(_) => {
                        return Err(ConvertError::UnsupportedMemberType {
                            relation: current.id,
                            member: member.target,
                            mode: AssemblyMode::LineSoup,
                        })
                    }
                }
            }
            soups.insert(current.id, lines);
        }

        soups
            .remove(&relation.id)
            .map(MultiLineString::new)
            .ok_or_else(|| missing_relation(relation.id))
    }
}
