//! Exit and entry sequences between two vertices.
//!
//! A [`Path`] is computed once per transition from the ancestor chains of its
//! source and target. The least common ancestor (LCA) of the two chains is
//! neither exited nor entered; everything below it on the source side is
//! exited innermost first, everything below it on the target side is entered
//! outermost first.

use super::element::{Hierarchy, VertexId};

/// Precomputed traversal between a source and a target vertex.
///
/// `exit_list` and `enter_list` hold only the ancestors strictly between the
/// LCA and the endpoints; the endpoints themselves are handled by the
/// traversal with the full two-phase handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    source: VertexId,
    target: VertexId,
    exit: Vec<VertexId>,
    enter: Vec<VertexId>,
}

impl Path {
    /// Compute the path between two vertices of the same hierarchy.
    ///
    /// Returns `None` when the vertices share no ancestor, which happens for
    /// the root itself or for handles from another hierarchy.
    pub(crate) fn between(tree: &Hierarchy, source: VertexId, target: VertexId) -> Option<Self> {
        let source_ancestors = tree.ancestors(source);
        let target_ancestors = tree.ancestors(target);
        let lca = lca(&source_ancestors, &target_ancestors)?;

        let exit = source_ancestors[lca + 1..].iter().rev().copied().collect();
        let enter = target_ancestors[lca + 1..].to_vec();

        Some(Path {
            source,
            target,
            exit,
            enter,
        })
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn target(&self) -> VertexId {
        self.target
    }

    /// Ancestors of the source below the LCA, innermost first.
    pub fn exit_list(&self) -> &[VertexId] {
        &self.exit
    }

    /// Ancestors of the target below the LCA, outermost first.
    pub fn enter_list(&self) -> &[VertexId] {
        &self.enter
    }

    /// Every vertex left by this path: the source, then its exited ancestors.
    pub fn exited(&self) -> Vec<VertexId> {
        std::iter::once(self.source)
            .chain(self.exit.iter().copied())
            .collect()
    }

    /// Every vertex entered by this path: the entered ancestors, then the target.
    pub fn entered(&self) -> Vec<VertexId> {
        self.enter
            .iter()
            .copied()
            .chain(std::iter::once(self.target))
            .collect()
    }
}

/// Index of the deepest element shared by both root-first chains.
pub(crate) fn lca(source: &[VertexId], target: &[VertexId]) -> Option<usize> {
    source
        .iter()
        .zip(target)
        .take_while(|(a, b)| a == b)
        .count()
        .checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::VertexKind;

    struct Tree {
        tree: Hierarchy,
        root: VertexId,
        a: VertexId,
        b: VertexId,
        c: VertexId,
        x: VertexId,
        d: VertexId,
        y: VertexId,
    }

    fn composite(tree: &mut Hierarchy, name: &str, parent: Option<VertexId>) -> VertexId {
        let owner = parent.and_then(|p| tree.vertex(p)?.kind.region());
        let id = tree.add_vertex(name, owner, VertexKind::Simple);
        let region = tree.add_region(name, id);
        tree.vertices[id.0].kind = VertexKind::Composite(region);
        id
    }

    fn leaf(tree: &mut Hierarchy, name: &str, parent: VertexId) -> VertexId {
        let owner = tree.vertex(parent).and_then(|p| p.kind.region());
        tree.add_vertex(name, owner, VertexKind::Simple)
    }

    // root
    // ├── a
    // ├── b
    // └── c
    //     ├── x
    //     └── d
    //         └── y
    fn tree() -> Tree {
        let mut tree = Hierarchy::default();
        let root = composite(&mut tree, "root", None);
        let a = leaf(&mut tree, "a", root);
        let b = leaf(&mut tree, "b", root);
        let c = composite(&mut tree, "c", Some(root));
        let x = leaf(&mut tree, "x", c);
        let d = composite(&mut tree, "d", Some(c));
        let y = leaf(&mut tree, "y", d);
        Tree {
            tree,
            root,
            a,
            b,
            c,
            x,
            d,
            y,
        }
    }

    #[test]
    fn lca_of_identical_chains_is_last_index() {
        let chain = [VertexId(0), VertexId(1)];
        assert_eq!(lca(&chain, &chain), Some(1));
    }

    #[test]
    fn lca_of_disjoint_chains_is_none() {
        assert_eq!(lca(&[VertexId(0)], &[VertexId(5)]), None);
        assert_eq!(lca(&[], &[VertexId(0)]), None);
    }

    #[test]
    fn sibling_path_exits_and_enters_one_vertex() {
        let t = tree();
        let path = Path::between(&t.tree, t.a, t.b).unwrap();

        assert!(path.exit_list().is_empty());
        assert!(path.enter_list().is_empty());
        assert_eq!(path.exited(), vec![t.a]);
        assert_eq!(path.entered(), vec![t.b]);
    }

    #[test]
    fn path_into_nested_state_enters_outermost_first() {
        let t = tree();
        let path = Path::between(&t.tree, t.a, t.y).unwrap();

        assert_eq!(path.exited(), vec![t.a]);
        assert_eq!(path.entered(), vec![t.c, t.d, t.y]);
    }

    #[test]
    fn path_out_of_nested_state_exits_innermost_first() {
        let t = tree();
        let path = Path::between(&t.tree, t.y, t.b).unwrap();

        assert_eq!(path.exit_list(), &[t.d, t.c]);
        assert_eq!(path.exited(), vec![t.y, t.d, t.c]);
        assert_eq!(path.entered(), vec![t.b]);
    }

    #[test]
    fn path_within_composite_keeps_composite_active() {
        let t = tree();
        let path = Path::between(&t.tree, t.y, t.x).unwrap();

        assert_eq!(path.exited(), vec![t.y, t.d]);
        assert_eq!(path.entered(), vec![t.x]);
        assert!(!path.exited().contains(&t.c));
    }

    #[test]
    fn self_transition_exits_and_reenters() {
        let t = tree();
        let path = Path::between(&t.tree, t.x, t.x).unwrap();

        assert_eq!(path.exited(), vec![t.x]);
        assert_eq!(path.entered(), vec![t.x]);
    }

    #[test]
    fn root_has_no_path() {
        let t = tree();

        assert!(Path::between(&t.tree, t.root, t.a).is_none());
        assert!(Path::between(&t.tree, t.a, t.root).is_none());
    }
}
