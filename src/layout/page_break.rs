//! # Page Break Decisions
//!
//! The pagination rule, kept free of any drawing so it can be exercised
//! with plain numbers. A block of height `h` at cursor `y` fits when
//! `y + h <= page_height - threshold`; a block that does not fit moves to
//! a fresh page whole, below the repeated table header. Blocks are never
//! split.

use serde::Serialize;

/// Where the renderer is in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Header,
    TableHeader,
    TableRow,
    SummaryRow,
    Finalizing,
}

/// Decide what to do with a block at the current cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Place the block on the current page (it fits).
    Place,
    /// Start a new page and place the block there.
    MoveToNextPage,
    /// The block is taller than a fresh page can hold. It is placed anyway,
    /// since moving it again would never help.
    Overflow,
}

/// Does a block of height `h` starting at `y` end above the threshold line?
pub fn fits(y: f64, h: f64, page_height: f64, threshold: f64) -> bool {
    y + h <= page_height - threshold
}

/// The page cursor. Owned by one render, copied through [`step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    /// Zero-based index of the page being filled.
    pub page_index: usize,
    /// Top of the next block, in points from the page top.
    pub y: f64,
    pub page_height: f64,
    /// Top margin; new pages start here.
    pub top: f64,
    /// True on a page opened by a break until its first block lands.
    pub continued: bool,
    pub phase: Phase,
}

impl LayoutState {
    pub fn new(page_height: f64, top: f64) -> Self {
        Self {
            page_index: 0,
            y: top,
            page_height,
            top,
            continued: false,
            phase: Phase::Header,
        }
    }

    pub fn decide(&self, height: f64, threshold: f64) -> BreakDecision {
        if fits(self.y, height, self.page_height, threshold) {
            BreakDecision::Place
        } else if self.continued {
            BreakDecision::Overflow
        } else {
            BreakDecision::MoveToNextPage
        }
    }

    /// Advance past a non-body block (header block, table header).
    pub fn skip(&mut self, height: f64) {
        self.y += height;
    }

    /// The state on a freshly opened page, below `repeat_height` of
    /// repeated table header.
    pub fn next_page(&self, repeat_height: f64) -> Self {
        Self {
            page_index: self.page_index + 1,
            y: self.top + repeat_height,
            continued: true,
            ..*self
        }
    }
}

/// Where one block landed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub page: usize,
    pub y: f64,
    pub height: f64,
    /// A new page (with a repeated table header) was opened for this block.
    pub breaks_before: bool,
    /// The block is taller than the space a fresh page offers. Its tail
    /// may end up under the footer band.
    pub overflows: bool,
}

/// Place one block: `(state, block) -> (state, placement)`.
///
/// `repeat_height` is the height of the content redrawn at the top of
/// every new page before the block (the table header).
pub fn step(
    state: LayoutState,
    height: f64,
    threshold: f64,
    repeat_height: f64,
) -> (LayoutState, Placement) {
    let (mut next, breaks_before) = match state.decide(height, threshold) {
        BreakDecision::Place | BreakDecision::Overflow => (state, false),
        BreakDecision::MoveToNextPage => (state.next_page(repeat_height), true),
    };

    let overflows = !fits(next.y, height, next.page_height, threshold);
    let placement = Placement {
        page: next.page_index,
        y: next.y,
        height,
        breaks_before,
        overflows,
    };

    next.y += height;
    next.continued = false;
    (next, placement)
}

/// Place a run of equally-thresholded blocks, threading the state through.
pub fn paginate(
    mut state: LayoutState,
    heights: &[f64],
    threshold: f64,
    repeat_height: f64,
) -> (LayoutState, Vec<Placement>) {
    let mut placements = Vec::with_capacity(heights.len());
    for &h in heights {
        let (next, placement) = step(state, h, threshold, repeat_height);
        placements.push(placement);
        state = next;
    }
    (state, placements)
}
