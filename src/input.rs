//! Input latch
//!
//! Keyboard, mouse and touch all drive the same logical button. Each
//! physical source owns one bit; the button is down while any bit is set,
//! so holding two sources and releasing one keeps it pressed and never
//! produces a second press edge.

/// Physical sources mapped onto the single logical button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Mouse,
    Touch,
}

impl InputSource {
    const fn bit(self) -> u8 {
        match self {
            InputSource::Keyboard => 1 << 0,
            InputSource::Mouse => 1 << 1,
            InputSource::Touch => 1 << 2,
        }
    }
}

/// Debounced logical button over several physical sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputLatch {
    bits: u8,
}

impl InputLatch {
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Record a source going down or up. Returns the new logical state when
    /// it changed, `None` otherwise (auto-repeat, second source, ...).
    pub fn set(&mut self, source: InputSource, down: bool) -> Option<bool> {
        let before = self.pressed();
        if down {
            self.bits |= source.bit();
        } else {
            self.bits &= !source.bit();
        }
        let after = self.pressed();
        (before != after).then_some(after)
    }

    pub fn press(&mut self, source: InputSource) -> Option<bool> {
        self.set(source, true)
    }

    pub fn release(&mut self, source: InputSource) -> Option<bool> {
        self.set(source, false)
    }

    #[inline]
    pub fn pressed(&self) -> bool {
        self.bits != 0
    }

    /// Drop every source (focus loss, restart)
    pub fn clear(&mut self) -> Option<bool> {
        let was = self.pressed();
        self.bits = 0;
        was.then_some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_source() {
        let mut latch = InputLatch::new();
        assert_eq!(latch.press(InputSource::Keyboard), Some(true));
        // Key auto-repeat
        assert_eq!(latch.press(InputSource::Keyboard), None);
        assert!(latch.pressed());
        assert_eq!(latch.release(InputSource::Keyboard), Some(false));
        assert!(!latch.pressed());
    }

    #[test]
    fn test_overlapping_sources_do_not_double_fire() {
        let mut latch = InputLatch::new();
        assert_eq!(latch.press(InputSource::Mouse), Some(true));
        assert_eq!(latch.press(InputSource::Touch), None);
        assert_eq!(latch.release(InputSource::Mouse), None);
        assert!(latch.pressed());
        assert_eq!(latch.release(InputSource::Touch), Some(false));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut latch = InputLatch::new();
        assert_eq!(latch.release(InputSource::Touch), None);
        assert_eq!(latch.clear(), None);
    }

    #[test]
    fn test_clear() {
        let mut latch = InputLatch::new();
        latch.press(InputSource::Keyboard);
        latch.press(InputSource::Mouse);
        assert_eq!(latch.clear(), Some(false));
        assert!(!latch.pressed());
    }
}
