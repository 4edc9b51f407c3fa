//! Opaque binding identifiers.

use std::fmt;

/// Identifier issued by the compile environment for every bound name.
///
/// IDs are monotonically increasing within one compilation and stay valid
/// after the frame that issued them is popped: the host IR refers to them
/// until the renaming pass replaces each one with a final textual name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        VarId(raw)
    }

    /// Index into the environment's side tables.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

mod size_asserts {
    use super::VarId;
    crate::static_assert_size!(VarId, 4);
}
