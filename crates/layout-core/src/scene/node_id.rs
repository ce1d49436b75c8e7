use std::num::NonZeroU32;

/// Highest generation that survives `to_u32` packing
pub const MAX_GENERATION: u32 = 0xFFF;

/// Scene node identifier (with generation)
/// - index: slot in the node arena
/// - generation: bumped when a slot is reused, so stale ids stop resolving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: NonZeroU32,
}

impl NodeId {
    /// `None` for generation 0, which is reserved as invalid
    pub fn new(index: u32, generation: u32) -> Option<Self> {
        NonZeroU32::new(generation).map(|generation| Self { index, generation })
    }

    pub(crate) const fn from_parts(index: u32, generation: NonZeroU32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation.get()
    }

    #[inline]
    pub(crate) fn generation_nonzero(&self) -> NonZeroU32 {
        self.generation
    }

    /// Packed id for JS hosts (upper 12 bits: generation, lower 20 bits: index)
    ///
    /// The arena retires a slot once it reaches `MAX_GENERATION`, so live and
    /// stale ids never share a packed value.
    #[inline]
    pub fn to_u32(&self) -> u32 {
        let generation_bits = (self.generation.get() & 0xFFF) << 20;
        let index_bits = self.index & 0xFFFFF;
        generation_bits | index_bits
    }

    /// Restore a packed id; `None` if the generation bits are zero
    #[inline]
    pub fn from_u32(id: u32) -> Option<Self> {
        Self::new(id & 0xFFFFF, (id >> 20) & 0xFFF)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_zero_is_invalid() {
        assert!(NodeId::new(0, 0).is_none());
        assert!(NodeId::from_u32(5).is_none());
    }

    #[test]
    fn test_to_u32_roundtrip() {
        let original = NodeId::new(12345, 7).unwrap();
        assert_eq!(NodeId::from_u32(original.to_u32()), Some(original));
    }

    #[test]
    fn test_max_generation_roundtrip() {
        let last = NodeId::new(9, MAX_GENERATION).unwrap();
        assert_eq!(NodeId::from_u32(last.to_u32()), Some(last));
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeId::new(3, 2).unwrap().to_string(), "3v2");
    }
}
