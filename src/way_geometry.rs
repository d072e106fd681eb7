use crate::element::{Node, Way};
use crate::error::{ConvertError, Result};
use crate::resolver::Resolver;
use geo::{Geometry, LineString, Point, Polygon};

/// Coordinates of a way plus whether its node ids close it.
#[derive(Debug, Clone, PartialEq)]
pub struct WayLine {
    pub line: LineString<f64>,
    pub closed: bool,
}

pub fn node_point(node: &Node) -> Point<f64> {
    Point::from(node.coord())
}

pub fn way_line(resolver: &Resolver<'_>, way: &Way) -> Result<WayLine> {
    if way.node_ids.len() < 2 {
        return Err(ConvertError::InsufficientGeometry {
            way: way.id,
            nodes: way.node_ids.len(),
        });
    }

    let coords = resolver.way_coords(way)?;
    Ok(WayLine {
        line: LineString::new(coords),
        closed: way.is_closed(),
    })
}

/// Turns a way into a ring polygon when it is closed, a line string otherwise.
pub fn synthesize(resolver: &Resolver<'_>, way: &Way) -> Result<Geometry<f64>> {
    let WayLine { line, closed } = way_line(resolver, way)?;
    if closed {
        Ok(Geometry::Polygon(Polygon::new(line, vec![])))
    } else {
        Ok(Geometry::LineString(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::OsmResult;
    use crate::test_utilities::{node, square_nodes, way};
    use geo::Area;

    #[test]
    fn test_closed_way_is_polygon() {
        let mut result = OsmResult::new();
        square_nodes(&mut result, 1, 0.0, 0.0, 10.0);
        let way = way(100, vec![1, 2, 3, 4, 1]);

        let geometry = synthesize(&Resolver::new(&result), &way).unwrap();
        let Geometry::Polygon(polygon) = geometry else {
            panic!("expected polygon");
        };
        assert!(polygon.interiors().is_empty());
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(polygon.unsigned_area(), 100.0);
    }

    #[test]
    fn test_open_way_is_line() {
        let mut result = OsmResult::new();
        square_nodes(&mut result, 1, 0.0, 0.0, 10.0);
        let way = way(100, vec![3, 1, 2]);

        let geometry = synthesize(&Resolver::new(&result), &way).unwrap();
        let Geometry::LineString(line) = geometry else {
            panic!("expected line string");
        };
        // Node order is kept
        let xs: Vec<f64> = line.coords().map(|c| c.x).collect();
        assert_eq!(xs, vec![10.0, 0.0, 10.0]);
    }

    #[test]
    fn test_closure_is_by_node_id() {
        let mut result = OsmResult::new();
        result.insert_node(node(1, 0.0, 0.0));
        result.insert_node(node(2, 1.0, 0.0));
        result.insert_node(node(3, 1.0, 1.0));
        // Same position as node 1, different id
        result.insert_node(node(4, 0.0, 0.0));
        let way = way(100, vec![1, 2, 3, 4]);

        let geometry = synthesize(&Resolver::new(&result), &way).unwrap();
        assert!(matches!(geometry, Geometry::LineString(_)));
    }

    #[test]
    fn test_degenerate_two_node_ring() {
        let mut result = OsmResult::new();
        result.insert_node(node(1, 3.0, 4.0));
        let way = way(100, vec![1, 1]);

        let geometry = synthesize(&Resolver::new(&result), &way).unwrap();
        assert!(matches!(geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn test_insufficient_nodes() {
        let mut result = OsmResult::new();
        result.insert_node(node(1, 3.0, 4.0));
        let resolver = Resolver::new(&result);

        for node_ids in [vec![], vec![1]] {
            let count = node_ids.len();
            match synthesize(&resolver, &way(100, node_ids)) {
                Err(ConvertError::InsufficientGeometry { way, nodes }) => {
                    assert_eq!(way, 100);
                    assert_eq!(nodes, count);
                }
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    #[test]
    fn test_node_point() {
        let point = node_point(&node(1, 13.4, 52.5));
        assert_eq!(point.x(), 13.4);
        assert_eq!(point.y(), 52.5);
    }
}
