//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::time::Instant;

use kurbo::Point;

use crate::core::collection::{BookError, PageCollection};
use crate::core::flip::Flip;
use crate::core::render::Orientation;
use crate::core::settings::Settings;
use crate::ui::content::SampleBook;
use crate::ui::view::BookView;

/// Top-level application state.
pub struct AppState {
    /// Content the pages draw from.
    pub book: SampleBook,
    /// Pages and their spread partitions.
    pub collection: PageCollection,
    /// The turn engine.
    pub flip: Flip,
    /// Render sink and screen placement of the book.
    pub view: BookView,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Where and when the left button went down; tells a click apart from
    /// the start of a drag when the button comes back up.
    pub press: Option<(Point, Instant)>,
    /// Transient notice shown in the status bar in place of the position
    /// summary, cleared by the next deliberate input.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(
        book: SampleBook,
        settings: Settings,
        forced_orientation: Option<Orientation>,
    ) -> Result<Self, BookError> {
        let collection = PageCollection::load(&book, &settings)?;
        let view = BookView::new(settings.size, forced_orientation);
        let flip = Flip::new(settings);
        Ok(Self {
            book,
            collection,
            flip,
            view,
            should_quit: false,
            press: None,
            status_message: None,
        })
    }
}
