use serde::{Deserialize, Serialize};
use std::fmt;

/// Default terminal columns.
pub const DEFAULT_COLS: u16 = 80;

/// Default terminal rows.
pub const DEFAULT_ROWS: u16 = 24;

/// Terminal viewport dimensions in character cells.
///
/// Both dimensions are guaranteed positive: the only constructors are
/// [`ViewportSize::new`], which rejects zeroes, and [`Default`], which
/// yields the conventional 80x24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    cols: u16,
    rows: u16,
}

impl ViewportSize {
    /// Build a viewport size, rejecting non-positive dimensions.
    pub fn new(cols: u16, rows: u16) -> Option<Self> {
        if cols == 0 || rows == 0 {
            return None;
        }
        Some(Self { cols, rows })
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
        }
    }
}

impl fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_80_by_24() {
        let size = ViewportSize::default();
        assert_eq!(size.cols(), 80);
        assert_eq!(size.rows(), 24);
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(ViewportSize::new(0, 24).is_none());
        assert!(ViewportSize::new(80, 0).is_none());
        assert!(ViewportSize::new(0, 0).is_none());
    }

    #[test]
    fn new_accepts_positive_dimensions() {
        let size = ViewportSize::new(120, 40).unwrap();
        assert_eq!(size.cols(), 120);
        assert_eq!(size.rows(), 40);
    }

    #[test]
    fn display_format() {
        let size = ViewportSize::new(132, 50).unwrap();
        assert_eq!(size.to_string(), "132x50");
    }

    #[test]
    fn serialization_round_trip() {
        let size = ViewportSize::new(100, 30).unwrap();
        let json = serde_json::to_string(&size).unwrap();
        let parsed: ViewportSize = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, size);
    }
}
