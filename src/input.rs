//! Raw pointer events as the surface consumes them.

/// Identity of a contact. Touch contacts carry the platform's finger id; the
/// mouse-like pointer shares one reserved identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerId {
    Finger(i64),
    Mouse,
}

/// Where an event happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Locus {
    /// Screen pixels.
    Pixel(f64, f64),
    /// Fractions of the display, `[0, 1]` on each axis. Touch input arrives this way.
    Display(f64, f64),
}

impl Locus {
    /// Resolve to pixels for a `screen_w` x `screen_h` display.
    pub fn to_pixel(self, screen_w: i32, screen_h: i32) -> (f64, f64) {
        match self {
            Locus::Pixel(x, y) => (x, y),
            Locus::Display(x, y) => (
                (x * (screen_w - 1) as f64).round(),
                (y * (screen_h - 1) as f64).round(),
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Down { pointer: PointerId, at: Locus },
    Move { pointer: PointerId, at: Locus },
    Up { pointer: PointerId },
    /// End of session: quit request or escape key.
    Quit,
}

impl InputEvent {
    #[cfg(test)]
    pub fn finger_down(id: i64, x: f64, y: f64) -> Self {
        Self::Down {
            pointer: PointerId::Finger(id),
            at: Locus::Pixel(x, y),
        }
    }

    #[cfg(test)]
    pub fn finger_move(id: i64, x: f64, y: f64) -> Self {
        Self::Move {
            pointer: PointerId::Finger(id),
            at: Locus::Pixel(x, y),
        }
    }

    pub fn finger_up(id: i64) -> Self {
        Self::Up {
            pointer: PointerId::Finger(id),
        }
    }

    pub fn mouse_down(x: f64, y: f64) -> Self {
        Self::Down {
            pointer: PointerId::Mouse,
            at: Locus::Pixel(x, y),
        }
    }

    pub fn mouse_move(x: f64, y: f64) -> Self {
        Self::Move {
            pointer: PointerId::Mouse,
            at: Locus::Pixel(x, y),
        }
    }

    pub fn mouse_up() -> Self {
        Self::Up {
            pointer: PointerId::Mouse,
        }
    }
}
