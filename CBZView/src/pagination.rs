//! Page navigation in single and dual-page mode
//!
//! Dual-page spreads keep the cover (page 1) standalone and pair the
//! remaining pages as (even, odd) in 1-based numbering: 2|3, 4|5, ...
//! Every transition here preserves that alignment so toggling modes
//! mid-read doesn't shift which page sits on which side.

/// Which half of a spread a fetched page belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRole {
    /// Current page: drawn first, clears the canvas
    Primary,
    /// Right-hand page of a dual spread, drawn over the existing canvas
    Secondary,
}

/// Pages needed to display the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spread {
    /// 0-based index of the current page
    pub primary: usize,
    /// 0-based index of the right-hand page, if one must be fetched
    pub secondary: Option<usize>,
    /// Draw into half-width regions rather than the full canvas
    pub dual_layout: bool,
}

impl Spread {
    /// Requests to issue, primary first
    pub fn requests(&self) -> impl Iterator<Item = (usize, PageRole)> {
        std::iter::once((self.primary, PageRole::Primary))
            .chain(self.secondary.map(|index| (index, PageRole::Secondary)))
    }
}

/// Current page, page count and display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    current_page: usize,
    total_pages: usize,
    dual_page: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ViewState {
    pub fn new(dual_page: bool) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            dual_page,
        }
    }

    /// Current page, 1-based
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_dual_page(&self) -> bool {
        self.dual_page
    }

    /// Start a freshly loaded document on its cover
    pub fn reset(&mut self, total_pages: usize) {
        self.total_pages = total_pages;
        self.current_page = 1;
    }

    /// Flip between single and dual-page mode
    ///
    /// Enabling dual mode on an odd page past the cover steps back one page
    /// so the current page becomes the left half of its spread.
    pub fn toggle_dual_page(&mut self) {
        self.dual_page = !self.dual_page;
        if self.dual_page && self.current_page > 1 && self.current_page % 2 == 1 {
            self.current_page -= 1;
        }
    }

    /// Advance one page or spread. Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if self.current_page >= self.total_pages {
            return false;
        }

        let before = self.current_page;
        if !self.dual_page {
            self.current_page += 1;
        } else {
            let target = if self.current_page == 1 { 2 } else { self.current_page + 2 };
            if target <= self.total_pages {
                self.current_page = target;
            } else {
                // Odd final page
                self.current_page = self.total_pages;
            }
        }
        self.current_page != before
    }

    /// Go back one page or spread. Returns whether the page changed.
    pub fn previous(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }

        if !self.dual_page {
            self.current_page -= 1;
        } else if self.current_page == self.total_pages && self.total_pages % 2 == 1 {
            self.current_page = self.total_pages - 1;
        } else if self.current_page <= 2 {
            self.current_page = 1;
        } else {
            self.current_page -= 2;
        }
        true
    }

    /// Whether the page at `index` (0-based) is displayed on its own
    pub fn shows_single_page(&self, index: usize) -> bool {
        !self.dual_page || index == 0
    }

    /// Pages to fetch for the current view
    pub fn spread(&self) -> Spread {
        let primary = self.current_page.saturating_sub(1);
        Spread {
            primary,
            secondary: self.secondary_for(primary),
            dual_layout: !self.shows_single_page(primary),
        }
    }

    fn secondary_for(&self, index: usize) -> Option<usize> {
        if self.shows_single_page(index) {
            return None;
        }

        let successor = index + 1;
        let in_range = successor < self.total_pages;

        // Even-indexed last page: only pair if a successor exists. It can't
        // while this is the last page; kept so the rule stays explicit.
        if index + 1 == self.total_pages && index % 2 == 0 {
            return in_range.then_some(successor);
        }

        if index % 2 == 1 && in_range {
            return Some(successor);
        }

        None
    }
}

/// Navigation intent for a click at `x` on a canvas `width` pixels wide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickZone {
    Previous,
    Next,
    None,
}

impl ClickZone {
    /// Left third goes back, right third goes forward
    pub fn from_position(x: f64, width: u32) -> Self {
        let width = f64::from(width);
        if x < width / 3.0 {
            ClickZone::Previous
        } else if x > width * 2.0 / 3.0 {
            ClickZone::Next
        } else {
            ClickZone::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total: usize, current: usize, dual: bool) -> ViewState {
        ViewState {
            current_page: current,
            total_pages: total,
            dual_page: dual,
        }
    }

    #[test]
    fn test_initial_state() {
        let view = ViewState::default();
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.total_pages(), 0);
        assert!(!view.is_dual_page());
    }

    #[test]
    fn test_toggle_on_cover_keeps_page() {
        let mut view = ViewState::new(false);
        view.reset(10);
        view.toggle_dual_page();
        assert!(view.is_dual_page());
        assert_eq!(view.current_page(), 1);

        assert!(view.next());
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn test_toggle_from_odd_page_realigns() {
        let mut view = state(10, 5, false);
        view.toggle_dual_page();
        assert_eq!(view.current_page(), 4);

        // Off and on again from an odd page
        view.toggle_dual_page();
        assert!(!view.is_dual_page());
        assert!(view.next());
        assert_eq!(view.current_page(), 5);
        view.toggle_dual_page();
        assert_eq!(view.current_page(), 4);
    }

    #[test]
    fn test_toggle_off_keeps_page() {
        let mut view = state(10, 4, true);
        view.toggle_dual_page();
        assert_eq!(view.current_page(), 4);
    }

    #[test]
    fn test_single_next_and_previous() {
        let mut view = state(3, 1, false);
        assert!(view.next());
        assert!(view.next());
        assert_eq!(view.current_page(), 3);
        assert!(!view.next());
        assert_eq!(view.current_page(), 3);

        assert!(view.previous());
        assert!(view.previous());
        assert!(!view.previous());
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_dual_next() {
        let mut view = state(10, 1, true);
        view.next();
        assert_eq!(view.current_page(), 2);

        let mut view = state(10, 3, true);
        view.next();
        assert_eq!(view.current_page(), 5);
    }

    #[test]
    fn test_dual_next_to_odd_final_page() {
        let mut view = state(11, 9, true);
        assert!(view.next());
        assert_eq!(view.current_page(), 11);
        assert!(!view.next());
        assert_eq!(view.current_page(), 11);
    }

    #[test]
    fn test_dual_next_clamps_to_last_page() {
        let mut view = state(10, 9, true);
        assert!(view.next());
        assert_eq!(view.current_page(), 10);
    }

    #[test]
    fn test_dual_previous() {
        let mut view = state(11, 11, true);
        assert!(view.previous());
        assert_eq!(view.current_page(), 10);

        let mut view = state(11, 2, true);
        assert!(view.previous());
        assert_eq!(view.current_page(), 1);

        let mut view = state(10, 6, true);
        assert!(view.previous());
        assert_eq!(view.current_page(), 4);

        let mut view = state(10, 1, true);
        assert!(!view.previous());
    }

    #[test]
    fn test_navigation_without_pages_is_noop() {
        let mut view = ViewState::new(true);
        assert!(!view.next());
        assert!(!view.previous());
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_reset_returns_to_cover() {
        let mut view = state(10, 6, true);
        view.reset(4);
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.total_pages(), 4);
        assert!(view.is_dual_page());
    }

    #[test]
    fn test_spread_single_mode() {
        let view = state(10, 4, false);
        let spread = view.spread();
        assert_eq!(spread.primary, 3);
        assert_eq!(spread.secondary, None);
        assert!(!spread.dual_layout);
    }

    #[test]
    fn test_spread_cover_is_single() {
        let view = state(10, 1, true);
        let spread = view.spread();
        assert_eq!(spread.primary, 0);
        assert_eq!(spread.secondary, None);
        assert!(!spread.dual_layout);
    }

    #[test]
    fn test_spread_pairs_odd_index_with_successor() {
        let view = state(10, 2, true);
        let spread = view.spread();
        assert_eq!(spread.primary, 1);
        assert_eq!(spread.secondary, Some(2));
        assert!(spread.dual_layout);
        let requests: Vec<_> = spread.requests().collect();
        assert_eq!(requests, vec![(1, PageRole::Primary), (2, PageRole::Secondary)]);
    }

    #[test]
    fn test_spread_last_page_of_even_total() {
        // Page 10 of 10 is index 9, odd, with no successor
        let view = state(10, 10, true);
        let spread = view.spread();
        assert_eq!(spread.primary, 9);
        assert_eq!(spread.secondary, None);
        assert!(spread.dual_layout);
    }

    #[test]
    fn test_spread_last_page_of_odd_total() {
        // Page 11 of 11 is index 10, even and last
        let view = state(11, 11, true);
        let spread = view.spread();
        assert_eq!(spread.primary, 10);
        assert_eq!(spread.secondary, None);
        assert!(spread.dual_layout);
    }

    #[test]
    fn test_spread_even_index_mid_book_has_no_secondary() {
        let view = state(10, 3, true);
        let spread = view.spread();
        assert_eq!(spread.primary, 2);
        assert_eq!(spread.secondary, None);
        assert!(spread.dual_layout);
    }

    #[test]
    fn test_click_zones() {
        assert_eq!(ClickZone::from_position(10.0, 300), ClickZone::Previous);
        assert_eq!(ClickZone::from_position(150.0, 300), ClickZone::None);
        assert_eq!(ClickZone::from_position(250.0, 300), ClickZone::Next);
    }
}
