use crate::query::probe::Probe;
use std::ptr;

///
/// PathNode
///
/// One step of the probe traversal. Nodes live on the call stack and link
/// back to their parent, so the ancestor chain is exactly the current path.
///

pub(super) struct PathNode<'a> {
    name: &'a str,
    parent: Option<&'a PathNode<'a>>,
    value: &'a dyn Probe,
}

impl<'a> PathNode<'a> {
    pub(super) const fn root(name: &'a str, value: &'a dyn Probe) -> Self {
        Self {
            name,
            parent: None,
            value,
        }
    }

    pub(super) const fn child(&'a self, name: &'a str, value: &'a dyn Probe) -> Self {
        Self {
            name,
            parent: Some(self),
            value,
        }
    }

    pub(super) const fn value(&self) -> &'a dyn Probe {
        self.value
    }

    /// True when this node's value is the same object as an ancestor's.
    /// Compares addresses, never contents.
    pub(super) fn spans_cycle(&self) -> bool {
        let own = ptr::from_ref(self.value);

        self.ancestors()
            .any(|ancestor| ptr::addr_eq(own, ptr::from_ref(ancestor.value)))
    }

    /// Dotted path from the root, root name included (`User.department`).
    pub(super) fn path(&self) -> String {
        let mut names = vec![self.name];
        names.extend(self.ancestors().map(|node| node.name));
        names.reverse();

        names.join(".")
    }

    fn ancestors(&self) -> impl Iterator<Item = &'a PathNode<'a>> {
        std::iter::successors(self.parent, |node| node.parent)
    }
}
