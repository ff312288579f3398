//! Number rendering for table cells.

use jv_protocol::{Cell, UNREADABLE_MARKER};

/// Largest supported number of decimal places.
pub const MAX_DECIMAL_PLACES: u32 = 15;

/// How numbers are written into the table.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    decimal_places: u32,
    separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::new(2, '.')
    }
}

impl NumberFormat {
    pub fn new(decimal_places: u32, separator: char) -> Self {
        Self {
            decimal_places: decimal_places.min(MAX_DECIMAL_PLACES),
            separator,
        }
    }

    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Field delimiter that cannot be confused with the decimal separator.
    pub fn delimiter(&self) -> u8 {
        if self.separator == ',' {
            b';'
        } else {
            b','
        }
    }

    /// Round to the configured places and render with the configured separator.
    ///
    /// Whole numbers keep a fractional part (`1.0`), matching how the
    /// tables have always been written.
    pub fn format(&self, value: f64) -> String {
        let text = format!("{:?}", round_to(value, self.decimal_places));
        if self.separator == '.' {
            text
        } else {
            text.replace('.', &self.separator.to_string())
        }
    }

    pub fn format_cell(&self, cell: &Cell) -> String {
        match cell {
            Cell::Reading(v) => self.format(*v),
            Cell::Unreadable => UNREADABLE_MARKER.to_string(),
        }
    }

    /// Parse text produced by [`NumberFormat::format`].
    pub fn parse(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        if self.separator == '.' {
            text.parse().ok()
        } else {
            text.replace(self.separator, ".").parse().ok()
        }
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_keep_fraction() {
        let fmt = NumberFormat::default();
        assert_eq!(fmt.format(0.0), "0.0");
        assert_eq!(fmt.format(1.0), "1.0");
        assert_eq!(fmt.format(-3.0), "-3.0");
    }

    #[test]
    fn rounds_to_places() {
        let fmt = NumberFormat::new(2, '.');
        assert_eq!(fmt.format(1.23456), "1.23");
        assert_eq!(fmt.format(0.1 + 0.2), "0.3");
        assert_eq!(fmt.format(-12.3456), "-12.35");
        assert_eq!(NumberFormat::new(0, '.').format(2.6), "3.0");
    }

    #[test]
    fn comma_separator() {
        let fmt = NumberFormat::new(2, ',');
        assert_eq!(fmt.format(1.5), "1,5");
        assert_eq!(fmt.format(-0.25), "-0,25");
        assert_eq!(fmt.format(4.0), "4,0");
    }

    #[test]
    fn delimiter_avoids_separator() {
        assert_eq!(NumberFormat::new(2, ',').delimiter(), b';');
        assert_eq!(NumberFormat::new(2, '.').delimiter(), b',');
        assert_eq!(NumberFormat::new(2, '\'').delimiter(), b',');
    }

    #[test]
    fn round_trip_within_precision() {
        for sep in ['.', ','] {
            let fmt = NumberFormat::new(3, sep);
            for x in [0.0, 0.0004, 1.2345, -7.777_7, 123.456_78, -0.5, 89.999_9] {
                let parsed = fmt.parse(&fmt.format(x)).unwrap();
                assert!(
                    (parsed - x).abs() <= 0.000_5 + 1e-12,
                    "sep {sep:?}: {x} -> {parsed}"
                );
            }
        }
    }

    #[test]
    fn unreadable_cell_marker() {
        let fmt = NumberFormat::default();
        assert_eq!(fmt.format_cell(&Cell::Unreadable), "error");
        assert_eq!(fmt.format_cell(&Cell::Reading(45.0)), "45.0");
    }

    #[test]
    fn places_are_clamped() {
        assert_eq!(NumberFormat::new(40, '.').decimal_places(), MAX_DECIMAL_PLACES);
    }
}
