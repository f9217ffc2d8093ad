//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* render state and turns it into cells on
//! the terminal.  No fold math happens here; the engine pushes what to
//! draw through [`view::BookView`].

pub mod book_widget;
pub mod content;
pub mod layout;
pub mod theme;
pub mod view;
