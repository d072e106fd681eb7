use crate::element::{Element, ElementKind, OsmId, OsmResult};
use crate::error::{ConvertError, Result};
use crate::feature::Feature;
use crate::relation_geometry::{AssemblyMode, RelationAssembler};
use crate::resolver::Resolver;
use crate::way_geometry::{node_point, synthesize};
use geo::Geometry;
use log::{debug, warn};
use rayon::prelude::*;

/// Entry point for turning elements of one Overpass result into features.
///
/// Every method that takes an `Option<OsmId>` falls back to the only
/// element of that kind when no id is given.
pub struct OverpassConverter<'a> {
    resolver: Resolver<'a>,
    annotate: bool,
}

impl<'a> OverpassConverter<'a> {
    pub fn new(result: &'a OsmResult) -> Self {
        Self {
            resolver: Resolver::new(result),
            annotate: false,
        }
    }

    /// Adds `@type` and `@id` tags naming the source element to every feature.
    pub fn annotated(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    pub fn node_feature(&self, id: Option<OsmId>) -> Result<Feature> {
        self.feature(ElementKind::Node, id, AssemblyMode::Polygon)
    }

    pub fn way_feature(&self, id: Option<OsmId>) -> Result<Feature> {
        self.feature(ElementKind::Way, id, AssemblyMode::Polygon)
    }

    pub fn relation_feature(&self, id: Option<OsmId>) -> Result<Feature> {
        self.feature(ElementKind::Relation, id, AssemblyMode::Polygon)
    }

    /// Relation as a MultiLineString of its members, without building rings.
    pub fn relation_feature_multi(&self, id: Option<OsmId>) -> Result<Feature> {
        self.feature(ElementKind::Relation, id, AssemblyMode::LineSoup)
    }

    /// `mode` only matters for relations.
    pub fn feature(&self, kind: ElementKind, id: Option<OsmId>, mode: AssemblyMode) -> Result<Feature> {
        let element = self.resolver.select(kind, id)?;
        let geometry = self.geometry(element, mode)?;
        let mut feature = Feature::new(geometry, element.tags().clone());
        if self.annotate {
            let reference = element.reference();
            feature.set_tag("@type", reference.kind.as_str());
            feature.set_tag("@id", reference.id.to_string());
        }
        Ok(feature)
    }

    fn geometry(&self, element: Element<'a>, mode: AssemblyMode) -> Result<Geometry<f64>> {
        match element {
            Element::Node(node) => Ok(Geometry::Point(node_point(node))),
            Element::Way(way) => synthesize(&self.resolver, way),
            Element::Relation(relation) => {
                RelationAssembler::new(self.resolver).assemble(relation, mode)
            }
        }
    }

    /// Converts every element of `kind` in parallel. Results keep the order
    /// of the result's id list, failures included.
    pub fn features(&self, kind: ElementKind, mode: AssemblyMode) -> Vec<(OsmId, Result<Feature>)> {
        let ids = self.resolver.result().ids(kind);
        debug!("Converting {} {kind} element(s)", ids.len());

        ids.par_iter()
            .map(|&id| (id, self.feature(kind, Some(id), mode)))
            .collect()
    }

    /// Builds a FeatureCollection of every element of `kind` that converts.
    /// Elements that fail are returned separately and left out.
    pub fn feature_collection(
        &self,
        kind: ElementKind,
        mode: AssemblyMode,
    ) -> (geojson::FeatureCollection, Vec<(OsmId, ConvertError)>) {
        let mut features = Vec::new();
        let mut failures = Vec::new();

        for (id, converted) in self.features(kind, mode) {
            match converted {
                Ok(feature) => features.push(feature.export()),
                Err(err) => {
                    warn!("Skipping {kind} {id}: {err}");
                    failures.push((id, err));
                }
            }
        }

        let collection = geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };
        (collection, failures)
    }
}
