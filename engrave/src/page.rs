//! Physical page geometry, in millimeters.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A3: PageSize = PageSize::new(297.0, 420.0);
    pub const A4: PageSize = PageSize::new(210.0, 297.0);
    pub const A5: PageSize = PageSize::new(148.0, 210.0);
    pub const LETTER: PageSize = PageSize::new(8.5 * 25.4, 11.0 * 25.4);
    pub const LEGAL: PageSize = PageSize::new(8.5 * 25.4, 14.0 * 25.4);
    pub const TABLOID: PageSize = PageSize::new(11.0 * 25.4, 17.0 * 25.4);
    pub const LEDGER: PageSize = PageSize::new(17.0 * 25.4, 11.0 * 25.4);

    pub const fn new(width: f64, height: f64) -> Self {
        Self::with_origin(0.0, 0.0, width, height)
    }

    pub const fn with_origin(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn portrait(self) -> Self {
        if self.width <= self.height {
            self
        } else {
            Self::with_origin(self.x, self.y, self.height, self.width)
        }
    }

    pub fn landscape(self) -> Self {
        if self.width >= self.height {
            self
        } else {
            Self::with_origin(self.x, self.y, self.height, self.width)
        }
    }
}

#[cfg(test)]
mod tests;
