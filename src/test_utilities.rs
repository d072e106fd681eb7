use crate::element::{ElementKind, ElementRef, Member, Node, OsmId, OsmResult, Relation, Tags, Way};

pub fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn node(id: OsmId, lon: f64, lat: f64) -> Node {
    Node {
        id,
        lon,
        lat,
        tags: Tags::new(),
    }
}

pub fn way(id: OsmId, node_ids: Vec<OsmId>) -> Way {
    Way {
        id,
        node_ids,
        tags: Tags::new(),
    }
}

/// Members given as `(type, ref, role)` like in Overpass JSON.
pub fn relation(id: OsmId, members: Vec<(&str, OsmId, &str)>) -> Relation {
    Relation {
        id,
        members: members
            .into_iter()
            .map(|(kind, target, role)| {
                let kind = ElementKind::from_osm_type(kind).expect("unknown member type");
                Member::new(ElementRef::new(kind, target), role)
            })
            .collect(),
        tags: tags(&[("type", "multipolygon")]),
    }
}

/// Inserts the four corners of an axis-aligned square as nodes
/// `first_id..first_id + 4`, counter-clockwise from the lower left.
pub fn square_nodes(result: &mut OsmResult, first_id: OsmId, x: f64, y: f64, side: f64) {
    let corners = [(x, y), (x + side, y), (x + side, y + side), (x, y + side)];
    for (i, (lon, lat)) in corners.into_iter().enumerate() {
        result.insert_node(node(first_id + i as OsmId, lon, lat));
    }
}

/// Inserts a closed square way over four fresh nodes and returns its id.
pub fn square_way(result: &mut OsmResult, way_id: OsmId, first_node: OsmId, x: f64, y: f64, side: f64) -> OsmId {
    square_nodes(result, first_node, x, y, side);
    let ids: Vec<OsmId> = (first_node..first_node + 4).chain([first_node]).collect();
    result.insert_way(way(way_id, ids));
    way_id
}

/// Outer square of side 10 at the origin with a centred inner square of side 2.
pub fn square_with_hole() -> OsmResult {
    let mut result = OsmResult::new();
    square_way(&mut result, 100, 1, 0.0, 0.0, 10.0);
    square_way(&mut result, 101, 11, 4.0, 4.0, 2.0);
    result.insert_relation(relation(
        1000,
        vec![("way", 100, "outer"), ("way", 101, "inner")],
    ));
    result
}
