//! Loaded-image region bookkeeping.

/// Half-open byte range `[start, end)` occupied by the loaded program image.
///
/// Instruction fetch is legal only inside this region; leaving it without
/// executing halt is the driver-loop boundary fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ImageRegion {
    /// Inclusive start address (the load base).
    pub start: u64,
    /// Exclusive end address.
    pub end: u64,
}

impl ImageRegion {
    /// Creates a region covering `len` bytes starting at `start`.
    #[must_use]
    pub const fn new(start: u64, len: u64) -> Self {
        Self {
            start,
            end: start.saturating_add(len),
        }
    }

    /// Number of bytes in the region.
    #[must_use]
    pub const fn len(self) -> u64 {
        self.end - self.start
    }

    /// Returns `true` when no image bytes were loaded.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns `true` when `width` bytes starting at `addr` lie inside the region.
    #[must_use]
    pub const fn contains_span(self, addr: u64, width: u64) -> bool {
        match addr.checked_add(width) {
            Some(end) => addr >= self.start && end <= self.end,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ImageRegion;

    #[test]
    fn span_checks_respect_half_open_bounds() {
        let region = ImageRegion::new(0x1000, 8);
        assert!(region.contains_span(0x1000, 4));
        assert!(region.contains_span(0x1004, 4));
        assert!(!region.contains_span(0x1008, 4));
        assert!(!region.contains_span(0x0FFC, 4));
        assert!(!region.contains_span(u64::MAX - 1, 4));
    }

    #[test]
    fn empty_region_contains_nothing() {
        let region = ImageRegion::new(0x1000, 0);
        assert!(region.is_empty());
        assert_eq!(region.len(), 0);
        assert!(!region.contains_span(0x1000, 4));
    }
}
