//! Point-in-time view of a device's axes, buttons and hats
//!
//! Indices follow a fixed, backend-independent convention so that the layout
//! table can address inputs by number. See the constants in [`axis`] and
//! [`button`].

/// Axis indices
pub mod axis {
    pub const LEFT_STICK_X: usize = 0;
    /// Positive is down
    pub const LEFT_STICK_Y: usize = 1;
    pub const LEFT_TRIGGER: usize = 2;
    pub const RIGHT_STICK_X: usize = 3;
    /// Positive is down
    pub const RIGHT_STICK_Y: usize = 4;
    pub const RIGHT_TRIGGER: usize = 5;

    pub const COUNT: usize = 6;
}

/// Button indices
pub mod button {
    pub const A: usize = 0;
    pub const B: usize = 1;
    pub const X: usize = 2;
    pub const Y: usize = 3;
    pub const LEFT_BUMPER: usize = 4;
    pub const RIGHT_BUMPER: usize = 5;
    pub const LEFT_STICK: usize = 6;
    pub const RIGHT_STICK: usize = 7;
    pub const SELECT: usize = 8;
    pub const START: usize = 9;
    pub const MODE: usize = 10;

    pub const COUNT: usize = 11;
}

pub const HAT_COUNT: usize = 1;

/// Hat switch position, each component in {-1, 0, 1}
///
/// `y` is positive when pushed up, `x` positive when pushed right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hat {
    pub x: i8,
    pub y: i8,
}

impl Hat {
    pub const CENTERED: Hat = Hat { x: 0, y: 0 };

    /// Builds a hat from four directional switches
    ///
    /// Opposite switches pressed together cancel out.
    pub fn from_switches(up: bool, down: bool, left: bool, right: bool) -> Self {
        Hat {
            x: right as i8 - left as i8,
            y: up as i8 - down as i8,
        }
    }
}

/// Read-only copy of one device's input state
///
/// Reads past the end of any list return the neutral value, so a device
/// with fewer inputs than the layout expects simply renders idle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
    pub hats: Vec<Hat>,
}

impl Snapshot {
    /// Snapshot of a device at rest with the given capability counts
    pub fn neutral(axis_count: usize, button_count: usize, hat_count: usize) -> Self {
        Self {
            axes: vec![0.0; axis_count],
            buttons: vec![false; button_count],
            hats: vec![Hat::CENTERED; hat_count],
        }
    }

    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    pub fn hat(&self, index: usize) -> Hat {
        self.hats.get(index).copied().unwrap_or(Hat::CENTERED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_are_neutral() {
        let snapshot = Snapshot::neutral(2, 1, 0);
        assert_eq!(snapshot.axis(axis::RIGHT_TRIGGER), 0.0);
        assert!(!snapshot.button(button::MODE));
        assert_eq!(snapshot.hat(0), Hat::CENTERED);
    }

    #[test]
    fn hat_from_switches() {
        assert_eq!(Hat::from_switches(true, false, false, true), Hat { x: 1, y: 1 });
        assert_eq!(Hat::from_switches(false, true, true, false), Hat { x: -1, y: -1 });
        assert_eq!(Hat::from_switches(true, true, true, true), Hat::CENTERED);
    }
}
