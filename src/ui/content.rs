//! Demo book content — generated pages of prose for the front-end.
//!
//! The core never sees this; it only counts pages and asks for densities
//! through [`PageProvider`]. Text layout (wrapping, centering, padding) is
//! done here so the widget can treat a page as a grid of prepared lines.

use crate::core::collection::PageProvider;
use crate::core::page::PageDensity;

const PARAGRAPHS: &[&str] = &[
    "A sheet of paper remembers every fold. Run a thumbnail along the \
     crease and the fibres on the outside of the bend stretch while the \
     inner ones crush together, and the sheet will forever prefer to \
     close along that line.",
    "Bookbinders exploit the memory of paper. A signature is folded, \
     pressed, and sewn before it ever meets its neighbours, so that the \
     finished block opens with a gentle reluctance instead of springing \
     shut.",
    "The grain of a sheet runs parallel to the direction the slurry \
     flowed on the wire. Fold with the grain and the crease is crisp; \
     fold against it and the surface cracks like dried mud.",
    "A cover is not a page. Board wants to pivot on its hinge in one \
     stiff sweep, and a binder who lets the covering cloth bunch at the \
     joint will hear about it every time the book is opened.",
    "Turn a page slowly and watch the light move across it. The curl is \
     a section of a cylinder whose radius shrinks as your hand travels, \
     until the sheet flattens onto its new side with a small sigh.",
    "Nothing dates a book like its dog-ears. Each one is a reader's \
     bookmark pressed into service, a fold the paper will keep long \
     after the passage it marked has been forgotten.",
];

/// One page of prepared content.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Heading centered at the top; empty means the body starts at row 0.
    pub title: String,
    /// Paragraphs, wrapped at render time.
    pub body: Vec<String>,
}

impl PageContent {
    /// Lay the page out as exactly `height` lines of exactly `width`
    /// columns, space-padded. Overflowing text is cut, not scrolled.
    pub fn layout_lines(&self, width: usize, height: usize) -> Vec<String> {
        let width = width.max(1);
        let mut lines = Vec::with_capacity(height);

        if !self.title.is_empty() {
            lines.push(center(&self.title, width));
            lines.push(String::new());
        }
        for paragraph in &self.body {
            if paragraph.is_empty() {
                lines.push(String::new());
            } else {
                lines.extend(wrap(paragraph, width));
                lines.push(String::new());
            }
        }

        lines.truncate(height);
        while lines.len() < height {
            lines.push(String::new());
        }
        for line in &mut lines {
            if line.len() < width {
                line.push_str(&" ".repeat(width - line.len()));
            }
        }
        lines
    }
}

/// A generated book: a stiff cover, leaves of prose, a stiff back.
#[derive(Debug, Clone)]
pub struct SampleBook {
    pages: Vec<PageContent>,
}

impl SampleBook {
    /// Build a book of `count` pages (at least one).
    pub fn generate(count: usize) -> Self {
        let count = count.max(1);
        let mut pages = Vec::with_capacity(count);

        pages.push(PageContent {
            title: "THE FOLDED LEAF".into(),
            body: vec![
                String::new(),
                "a short book about paper".into(),
                String::new(),
                "drag a corner, or click one, to turn".into(),
            ],
        });

        for page in 1..count.saturating_sub(1) {
            let title = if (page - 1) % 4 == 0 {
                format!("Chapter {}", (page - 1) / 4 + 1)
            } else {
                String::new()
            };
            let start = (page - 1) * 2;
            let body = (0..2)
                .map(|i| PARAGRAPHS[(start + i) % PARAGRAPHS.len()].to_string())
                .collect();
            pages.push(PageContent { title, body });
        }

        if count > 1 {
            pages.push(PageContent {
                title: String::new(),
                body: vec![
                    String::new(),
                    String::new(),
                    "Set in terminal cells.".into(),
                    "No paper was creased in the making of this book.".into(),
                ],
            });
        }

        Self { pages }
    }

    pub fn page(&self, index: usize) -> Option<&PageContent> {
        self.pages.get(index)
    }

    /// The cover title.
    pub fn title(&self) -> &str {
        &self.pages[0].title
    }
}

impl PageProvider for SampleBook {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Covers are card stock, everything between them is paper.
    fn density(&self, page: usize) -> PageDensity {
        if page == 0 || page + 1 == self.pages.len() {
            PageDensity::Hard
        } else {
            PageDensity::Soft
        }
    }
}

/// Greedy word wrap. Words wider than the line are hard-broken; widths are
/// byte widths, which is exact for the ASCII prose above.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let (head, tail) = word.split_at(width);
            lines.push(head.to_string());
            word = tail;
        }
        if line.is_empty() {
            line.push_str(word);
        } else if line.len() + 1 + word.len() <= width {
            line.push(' ');
            line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn center(text: &str, width: usize) -> String {
    let text: String = text.chars().take(width).collect();
    let pad = (width - text.len()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}
