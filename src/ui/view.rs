//! Terminal-side view state — the engine's render sink plus the geometry
//! that places the book inside the terminal area.
//!
//! One terminal cell is one coordinate unit on both axes, so pointer
//! positions and fold geometry share the same space without scaling.

use kurbo::Point;
use ratatui::layout::Rect;

use crate::core::calc::{FlipDirection, SheetRect};
use crate::core::page::PageId;
use crate::core::render::{BookRect, Orientation, RenderSink, ShadowData};
use crate::core::settings::{SizeMode, MIN_PAGE_WIDTH};

/// Where the book sits on screen and what the engine wants drawn there.
pub struct BookView {
    size: SizeMode,
    forced_orientation: Option<Orientation>,

    rect: BookRect,
    orientation: Orientation,
    direction: FlipDirection,

    /// Static page of the left half (landscape only).
    pub left: Option<PageId>,
    /// Static page of the right half.
    pub right: Option<PageId>,
    /// Page riding the fold, when a turn is in progress.
    pub flipping: Option<PageId>,
    /// Page revealed underneath the fold.
    pub bottom: Option<PageId>,
    pub shadow: Option<ShadowData>,
    pub sheet: Option<SheetRect>,
}

impl BookView {
    pub fn new(size: SizeMode, forced_orientation: Option<Orientation>) -> Self {
        Self {
            size,
            forced_orientation,
            rect: BookRect {
                left: 0.0,
                top: 0.0,
                width: 0.0,
                height: 0.0,
                page_width: 0.0,
            },
            orientation: forced_orientation.unwrap_or(Orientation::Landscape),
            direction: FlipDirection::Forward,
            left: None,
            right: None,
            flipping: None,
            bottom: None,
            shadow: None,
            sheet: None,
        }
    }

    /// Fit the book into `area` and pick the orientation. Returns whether
    /// the geometry moved, in which case any in-flight turn is stale and
    /// the caller should reset the flip machine.
    pub fn layout(&mut self, area: Rect) -> bool {
        // One cell of breathing room on every side.
        let usable_w = area.width.saturating_sub(2).max(1);
        let usable_h = area.height.saturating_sub(2).max(1);

        let orientation = self.forced_orientation.unwrap_or(match self.size {
            SizeMode::Fixed { width, .. } => {
                if u32::from(width) * 2 <= u32::from(usable_w) {
                    Orientation::Landscape
                } else {
                    Orientation::Portrait
                }
            }
            SizeMode::Stretch => {
                if usable_w >= MIN_PAGE_WIDTH * 2 {
                    Orientation::Landscape
                } else {
                    Orientation::Portrait
                }
            }
        });

        let max_page_w = match orientation {
            Orientation::Landscape => usable_w / 2,
            Orientation::Portrait => usable_w,
        };
        let (page_w, page_h) = match self.size {
            SizeMode::Fixed { width, height } => {
                (width.min(max_page_w).max(1), height.min(usable_h).max(1))
            }
            SizeMode::Stretch => (max_page_w.max(1), usable_h),
        };

        let visible_w = match orientation {
            Orientation::Landscape => page_w * 2,
            Orientation::Portrait => page_w,
        };
        let visible_left = area.x + area.width.saturating_sub(visible_w) / 2;
        let top = area.y + area.height.saturating_sub(page_h) / 2;

        // Portrait pushes the phantom left half off the visible book, so
        // the single page lands on the right half of the rect.
        let phantom = match orientation {
            Orientation::Portrait => f64::from(page_w),
            Orientation::Landscape => 0.0,
        };
        let rect = BookRect {
            left: f64::from(visible_left) - phantom,
            top: f64::from(top),
            width: f64::from(page_w) * 2.0,
            height: f64::from(page_h),
            page_width: f64::from(page_w),
        };

        let changed = rect != self.rect || orientation != self.orientation;
        self.rect = rect;
        self.orientation = orientation;
        changed
    }
}

impl RenderSink for BookView {
    fn set_left_page(&mut self, page: Option<PageId>) {
        self.left = page;
    }

    fn set_right_page(&mut self, page: Option<PageId>) {
        self.right = page;
    }

    fn set_flipping_page(&mut self, page: Option<PageId>) {
        self.flipping = page;
        if page.is_none() {
            self.sheet = None;
        }
    }

    fn set_bottom_page(&mut self, page: Option<PageId>) {
        self.bottom = page;
    }

    fn set_shadow(&mut self, shadow: ShadowData) {
        self.shadow = Some(shadow);
    }

    fn clear_shadow(&mut self) {
        self.shadow = None;
    }

    fn set_page_rect(&mut self, sheet: SheetRect) {
        self.sheet = Some(sheet);
    }

    fn set_direction(&mut self, direction: FlipDirection) {
        self.direction = direction;
    }

    fn direction(&self) -> FlipDirection {
        self.direction
    }

    fn rect(&self) -> BookRect {
        self.rect
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }
}
