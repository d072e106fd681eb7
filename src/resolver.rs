use crate::element::{Element, ElementKind, ElementRef, Member, OsmId, OsmResult, Relation, Way};
use crate::error::{ConvertError, Result};
use fnv::FnvHashSet;
use geo::Coord;

/// Looks up elements of a single [`OsmResult`].
///
/// The resolver only borrows the result, so one instance (or many) can be
/// shared between threads converting different elements.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    result: &'a OsmResult,
}

enum Visit<'a> {
    Enter(&'a Relation),
    Exit(&'a Relation),
}

impl<'a> Resolver<'a> {
    pub fn new(result: &'a OsmResult) -> Self {
        Self { result }
    }

    pub fn result(&self) -> &'a OsmResult {
        self.result
    }

    pub fn resolve(&self, reference: ElementRef) -> Result<Element<'a>> {
        Ok(match reference.kind {
            ElementKind::Node => Element::Node(self.result.get_node(reference.id)?),
            ElementKind::Way => Element::Way(self.result.get_way(reference.id)?),
            ElementKind::Relation => Element::Relation(self.result.get_relation(reference.id)?),
        })
    }

    /// Resolves the element a relation member points to (one level only).
    pub fn resolve_member(&self, member: &Member) -> Result<Element<'a>> {
        self.resolve(member.target)
    }

    /// Picks the only element of `kind`, used when the caller gave no id.
    pub fn default_id(&self, kind: ElementKind) -> Result<OsmId> {
        match self.result.ids(kind) {
            [] => Err(ConvertError::NoCandidate { kind }),
            [id] => Ok(*id),
            ids => Err(ConvertError::AmbiguousSelection {
                kind,
                ids: ids.to_vec(),
            }),
        }
    }

    pub fn select(&self, kind: ElementKind, id: Option<OsmId>) -> Result<Element<'a>> {
        let id = match id {
            Some(id) => id,
            None => self.default_id(kind)?,
        };
        self.resolve(ElementRef::new(kind, id))
    }

    pub fn way_coords(&self, way: &Way) -> Result<Vec<Coord<f64>>> {
        way.node_ids
            .iter()
            .map(|&id| self.result.get_node(id).map(|node| node.coord()))
            .collect()
    }

    /// Collects `root` and every relation nested below it, children first
    /// and `root` last. Only members returned by `members_of` are followed.
    ///
    /// Walks with an explicit stack. A relation met again while it is still
    /// on the current path is a cycle; one reached twice through different
    /// parents is not, and is returned once.
    pub fn relation_order<F>(&self, root: &'a Relation, members_of: F) -> Result<Vec<&'a Relation>>
    where
        F: Fn(&'a Relation) -> Vec<&'a Member>,
    {
        let mut order: Vec<&'a Relation> = Vec::new();
        let mut done: FnvHashSet<OsmId> = FnvHashSet::default();
        let mut path: Vec<OsmId> = Vec::new();
        let mut stack: Vec<Visit<'a>> = vec![Visit::Enter(root)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(relation) => {
                    if done.contains(&relation.id) {
                        continue;
                    }
                    if path.contains(&relation.id) {
                        return Err(ConvertError::CyclicReference {
                            relation: relation.id,
                            path,
                        });
                    }
                    path.push(relation.id);
                    stack.push(Visit::Exit(relation));

                    // Reversed so members are entered in their listed order
                    for member in members_of(relation).into_iter().rev() {
                        if member.target.kind == ElementKind::Relation {
                            let child = self.result.get_relation(member.target.id)?;
                            stack.push(Visit::Enter(child));
                        }
                    }
                }
                Visit::Exit(relation) => {
                    path.pop();
                    if done.insert(relation.id) {
                        order.push(relation);
                    }
                }
            }
        }

        Ok(order)
    }
}
