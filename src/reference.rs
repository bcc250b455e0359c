use std::fmt::{Display, Formatter};

/// Handle to a node in a [`Session`][crate::session::Session] arena.
///
/// Handles are plain indices: cheap to copy, hashable, and only meaningful for the
/// session that produced them. The arena is append-only, so a node's children
/// always have smaller indices than the node itself.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(u32);

impl Ref {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the internal representation of the reference.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_index() {
        let r = Ref::new(7);
        assert_eq!(r.index(), 7);
        assert_eq!(r.get(), 7);
        assert_eq!(r.to_string(), "@7");
    }

    #[test]
    fn test_ref_ordering() {
        assert!(Ref::new(1) < Ref::new(2));
    }
}
