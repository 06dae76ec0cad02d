/// Axis-aligned integer rectangle in window/screen pixels.
///
/// A rectangle whose `right <= left` or `bottom <= top` is empty and covers no
/// pixels. Containment is half-open, matching how GDI rasterises regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Overlap of two rectangles, `None` when they do not share a pixel.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    /// `self` minus `hole`, as up to four disjoint bands.
    ///
    /// Full-width bands above and below the hole are emitted first, then the
    /// left and right slivers level with it.
    pub fn subtract(&self, hole: &Rect) -> Vec<Rect> {
        if self.is_empty() {
            return Vec::new();
        }
        let Some(cut) = self.intersect(hole) else {
            return vec![*self];
        };

        let pieces = [
            Rect::new(self.left, self.top, self.right, cut.top),
            Rect::new(self.left, cut.bottom, self.right, self.bottom),
            Rect::new(self.left, cut.top, cut.left, cut.bottom),
            Rect::new(cut.right, cut.top, self.right, cut.bottom),
        ];
        pieces.into_iter().filter(|r| !r.is_empty()).collect()
    }
}

/// Set of pixels described by pairwise-disjoint rectangles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn from_rect(rect: Rect) -> Self {
        let rects = if rect.is_empty() { Vec::new() } else { vec![rect] };
        Self { rects }
    }

    pub fn subtract(&mut self, hole: &Rect) {
        if hole.is_empty() {
            return;
        }
        self.rects = self
            .rects
            .iter()
            .flat_map(|r| r.subtract(hole))
            .collect();
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains(x, y))
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn area(&self) -> i64 {
        self.rects
            .iter()
            .map(|r| r.width() as i64 * r.height() as i64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_rects_are_empty() {
        assert!(Rect::new(10, 10, 10, 20).is_empty());
        assert!(Rect::new(10, 20, 30, 5).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
        assert_eq!(Rect::new(10, 10, 5, 5).width(), 0);
    }

    #[test]
    fn containment_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(0, 0));
        assert!(r.contains(9, 9));
        assert!(!r.contains(10, 5));
        assert!(!r.contains(5, 10));
    }

    #[test]
    fn subtract_inner_hole_yields_four_bands() {
        let outer = Rect::new(0, 0, 100, 100);
        let pieces = outer.subtract(&Rect::new(25, 25, 75, 75));
        assert_eq!(pieces.len(), 4);
        let area: i64 = pieces
            .iter()
            .map(|r| r.width() as i64 * r.height() as i64)
            .sum();
        assert_eq!(area, 100 * 100 - 50 * 50);
    }

    #[test]
    fn subtract_disjoint_hole_keeps_rect() {
        let outer = Rect::new(0, 0, 10, 10);
        assert_eq!(outer.subtract(&Rect::new(20, 20, 30, 30)), vec![outer]);
    }

    #[test]
    fn subtract_covering_hole_removes_everything() {
        let outer = Rect::new(5, 5, 10, 10);
        assert!(outer.subtract(&Rect::new(0, 0, 20, 20)).is_empty());
    }

    #[test]
    fn region_pieces_stay_disjoint() {
        let mut region = Region::from_rect(Rect::new(0, 0, 200, 200));
        region.subtract(&Rect::new(50, 50, 150, 150));
        region.subtract(&Rect::new(100, 0, 200, 100));
        let rects = region.rects();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(a.intersect(b).is_none(), "{a:?} overlaps {b:?}");
            }
        }
        assert!(region.contains(10, 10));
        assert!(!region.contains(120, 20));
        assert!(!region.contains(60, 60));
        assert!(region.contains(60, 170));
    }
}
