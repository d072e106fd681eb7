//! Ring reconstruction from line fragments.
//!
//! Relation members often split one ring over several ways. Fragments are
//! joined wherever their endpoints land on the same coordinate, in whichever
//! direction fits, until every chain closes on itself.

use fnv::FnvHashMap;
use geo::{Coord, LineString, Polygon};
use std::fmt;

/// Endpoints that no other fragment continues from.
#[derive(Debug, Clone, PartialEq)]
pub struct Dangling {
    pub endpoints: Vec<Coord<f64>>,
}

impl fmt::Display for Dangling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dangling endpoint(s)", self.endpoints.len())?;
        for c in &self.endpoints {
            write!(f, " ({}, {})", c.x, c.y)?;
        }
        Ok(())
    }
}

type CoordKey = (u64, u64);

fn coord_key(c: Coord<f64>) -> CoordKey {
    // -0.0 and 0.0 share a key
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

/// Merges fragments into closed rings and returns one polygon per ring.
///
/// Closed fragments pass through unchanged. Open fragments are chained at
/// exactly equal endpoints; every endpoint must be shared by an even number
/// of fragment ends, otherwise nothing is returned and the offending
/// endpoints are reported. Chaining continues with the lowest unused
/// fragment. When a chain comes back to a vertex it already passed, the loop
/// since that vertex is split off as its own ring, so rings that touch at a
/// point never come out as one self-touching ring.
pub fn polygonize(fragments: Vec<LineString<f64>>) -> Result<Vec<Polygon<f64>>, Dangling> {
    let mut rings: Vec<LineString<f64>> = Vec::new();
    let mut open: Vec<LineString<f64>> = Vec::new();
    for line in fragments {
        if line.0.is_empty() {
            continue;
        }
        if line.is_closed() {
            rings.push(line);
        } else {
            open.push(line);
        }
    }

    // Fragment indices by endpoint, ascending
    let mut ends: FnvHashMap<CoordKey, Vec<usize>> = FnvHashMap::default();
    for (i, line) in open.iter().enumerate() {
        let (first, last) = endpoints(line);
        ends.entry(coord_key(first)).or_default().push(i);
        ends.entry(coord_key(last)).or_default().push(i);
    }

    let mut dangling: Vec<Coord<f64>> = ends
        .iter()
        .filter(|(_, fragments)| fragments.len() % 2 == 1)
        .map(|(&(x, y), _)| Coord {
            x: f64::from_bits(x),
            y: f64::from_bits(y),
        })
        .collect();
    if !dangling.is_empty() {
        dangling.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        return Err(Dangling {
            endpoints: dangling,
        });
    }

    let mut used = vec![false; open.len()];
    for start in 0..open.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let mut chain = Chain::default();
        chain.extend(open[start].0.iter().copied(), &mut rings);

        // Back at a single vertex means the chain closed on its start
        while let Some(end) = chain.end() {
            // Even endpoint degrees guarantee a continuation
            let next = ends
                .get(&coord_key(end))
                .and_then(|candidates| candidates.iter().copied().find(|&i| !used[i]));
            let Some(next) = next else {
                return Err(Dangling {
                    endpoints: vec![end],
                });
            };
            used[next] = true;

            let line = &open[next].0;
            if coord_key(line[0]) == coord_key(end) {
                chain.extend(line.iter().skip(1).copied(), &mut rings);
            } else {
                chain.extend(line.iter().rev().skip(1).copied(), &mut rings);
            }
        }
    }

    Ok(rings
        .into_iter()
        .map(|ring| Polygon::new(ring, vec![]))
        .collect())
}

/// Open path being walked, with the position of every vertex on it.
#[derive(Default)]
struct Chain {
    coords: Vec<Coord<f64>>,
    positions: FnvHashMap<CoordKey, usize>,
}

impl Chain {
    fn push(&mut self, coord: Coord<f64>, rings: &mut Vec<LineString<f64>>) {
        let key = coord_key(coord);
        let Some(&at) = self.positions.get(&key) else {
            self.positions.insert(key, self.coords.len());
            self.coords.push(coord);
            return;
        };

        // Cut the loop back to `at`, which stays on the chain
        let mut ring: Vec<Coord<f64>> = self.coords.split_off(at + 1);
        for c in &ring {
            self.positions.remove(&coord_key(*c));
        }
        ring.insert(0, self.coords[at]);
        ring.push(coord);
        // Back-and-forth spikes enclose nothing
        if ring.len() >= 4 {
            rings.push(LineString::new(ring));
        }
    }

    fn extend(&mut self, coords: impl Iterator<Item = Coord<f64>>, rings: &mut Vec<LineString<f64>>) {
        for coord in coords {
            self.push(coord, rings);
        }
    }

    /// Last vertex, or `None` once only the start vertex is left.
    fn end(&self) -> Option<Coord<f64>> {
        match self.coords.as_slice() {
            [] | [_] => None,
            [.., last] => Some(*last),
        }
    }
}

fn endpoints(line: &LineString<f64>) -> (Coord<f64>, Coord<f64>) {
    (line.0[0], line.0[line.0.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, Area};

    fn total_area(polygons: &[Polygon<f64>]) -> f64 {
        polygons.iter().map(|p| p.unsigned_area()).sum()
    }

    /// Vertex sets per ring, so rings compare regardless of start and direction.
    fn vertex_sets(polygons: &[Polygon<f64>]) -> Vec<Vec<(f64, f64)>> {
        let mut sets: Vec<Vec<(f64, f64)>> = polygons
            .iter()
            .map(|p| {
                let mut set: Vec<(f64, f64)> = p.exterior().coords().map(|c| (c.x, c.y)).collect();
                set.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
                set.dedup();
                set
            })
            .collect();
        sets.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sets
    }

    #[test]
    fn test_two_fragments_close_one_ring() {
        let a = line_string![(x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.)];
        let b = line_string![(x: 4., y: 4.), (x: 0., y: 4.), (x: 0., y: 0.)];

        let polygons = polygonize(vec![a, b]).unwrap();
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].exterior().is_closed());
        assert_eq!(polygons[0].exterior().0.len(), 5);
        assert_eq!(total_area(&polygons), 16.0);
    }

    #[test]
    fn test_reversed_fragment() {
        let a = line_string![(x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.)];
        // Runs against the direction of `a`
        let b = line_string![(x: 0., y: 0.), (x: 0., y: 4.), (x: 4., y: 4.)];

        let polygons = polygonize(vec![a, b]).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(total_area(&polygons), 16.0);
    }

    #[test]
    fn test_closed_fragment_passes_through() {
        let ring = line_string![(x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.), (x: 0., y: 0.)];
        let polygons = polygonize(vec![ring.clone()]).unwrap();
        assert_eq!(polygons, vec![Polygon::new(ring, vec![])]);
    }

    #[test]
    fn test_dangling_fragment() {
        let a = line_string![(x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.)];
        let err = polygonize(vec![a]).unwrap_err();
        assert_eq!(
            err.endpoints,
            vec![Coord { x: 0., y: 0. }, Coord { x: 4., y: 4. }]
        );
        assert_eq!(err.to_string(), "2 dangling endpoint(s) (0, 0) (4, 4)");
    }

    #[test]
    fn test_order_independent() {
        let fragments = vec![
            line_string![(x: 0., y: 0.), (x: 3., y: 0.)],
            line_string![(x: 3., y: 0.), (x: 3., y: 3.)],
            line_string![(x: 0., y: 3.), (x: 3., y: 3.)],
            line_string![(x: 0., y: 3.), (x: 0., y: 0.)],
            line_string![(x: 10., y: 10.), (x: 11., y: 10.), (x: 11., y: 11.)],
            line_string![(x: 11., y: 11.), (x: 10., y: 10.)],
        ];
        let forward = polygonize(fragments.clone()).unwrap();

        let mut reversed = fragments;
        reversed.reverse();
        let backward = polygonize(reversed).unwrap();

        assert_eq!(forward.len(), 2);
        assert_eq!(backward.len(), 2);
        assert_eq!(total_area(&forward), 9.5);
        assert_eq!(total_area(&backward), 9.5);
    }

    #[test]
    fn test_rings_touching_at_a_vertex_stay_apart() {
        let a1 = line_string![(x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 10.)];
        let a2 = line_string![(x: 10., y: 10.), (x: 0., y: 10.), (x: 0., y: 0.)];
        let b1 = line_string![(x: 10., y: 10.), (x: 20., y: 10.), (x: 20., y: 20.)];
        let b2 = line_string![(x: 20., y: 20.), (x: 10., y: 20.), (x: 10., y: 10.)];

        let orders = [
            vec![a1.clone(), a2.clone(), b1.clone(), b2.clone()],
            vec![a1.clone(), b1.clone(), a2.clone(), b2.clone()],
            vec![b2, a2, b1, a1],
        ];
        let expected = vec![
            vec![(0., 0.), (0., 10.), (10., 0.), (10., 10.)],
            vec![(10., 10.), (10., 20.), (20., 10.), (20., 20.)],
        ];
        for fragments in orders {
            let polygons = polygonize(fragments).unwrap();
            assert_eq!(polygons.len(), 2);
            for polygon in &polygons {
                assert_eq!(polygon.exterior().0.len(), 5);
            }
            assert_eq!(vertex_sets(&polygons), expected);
        }
    }

    #[test]
    fn test_pinch_inside_a_fragment_splits_ring() {
        // Both fragments pass through (10, 10) without ending there
        let a = line_string![(x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 10.), (x: 20., y: 10.), (x: 20., y: 20.)];
        let b = line_string![(x: 20., y: 20.), (x: 10., y: 20.), (x: 10., y: 10.), (x: 0., y: 10.), (x: 0., y: 0.)];

        let polygons = polygonize(vec![a, b]).unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(total_area(&polygons), 200.0);
        for polygon in &polygons {
            assert_eq!(polygon.exterior().0.len(), 5);
            assert!(polygon.exterior().is_closed());
        }
    }

    #[test]
    fn test_spike_encloses_nothing() {
        let a = line_string![(x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.), (x: 6., y: 4.), (x: 4., y: 4.)];
        let b = line_string![(x: 4., y: 4.), (x: 0., y: 4.), (x: 0., y: 0.)];

        let polygons = polygonize(vec![a, b]).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(total_area(&polygons), 16.0);
    }

    #[test]
    fn test_signed_zero_matches() {
        let a = line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)];
        let b = line_string![(x: 1., y: 1.), (x: -0., y: 0.)];
        assert_eq!(polygonize(vec![a, b]).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(polygonize(vec![]).unwrap().is_empty());
        assert!(polygonize(vec![LineString::new(vec![])]).unwrap().is_empty());
    }
}
