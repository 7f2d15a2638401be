use crate::domain::model::book::{Book, Partition};
use crate::domain::renderer::{ShelfRenderer, ShelfView};

/// 本棚をMarkdownに描画する。最後に描画したフレームを保持する。
///
/// 各行にはIDを載せる。ホストはそのIDで toggle / edit / delete をディスパッチする。
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    frame: String,
    frames: u64,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> &str {
        &self.frame
    }

    /// これまでに描画した回数
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn render_to_string(view: &ShelfView<'_>) -> String {
        let mut sections = Vec::with_capacity(3);
        sections.push(match view.query {
            Some(q) => format!("# Bookshelf (search: \"{q}\")"),
            None => "# Bookshelf".to_string(),
        });
        for partition in [Partition::Incomplete, Partition::Complete] {
            let books: Vec<&Book> = view.partition(partition).collect();
            let mut section = format!("## {} ({})\n\n", heading(partition), books.len());
            if books.is_empty() {
                section.push_str("_(empty)_");
            } else {
                let lines: Vec<String> = books
                    .iter()
                    .map(|b| render_line(b, view.editing == Some(b.id())))
                    .collect();
                section.push_str(&lines.join("\n"));
            }
            sections.push(section);
        }
        sections.join("\n\n")
    }
}

impl ShelfRenderer for MarkdownRenderer {
    fn render(&mut self, view: &ShelfView<'_>) {
        self.frame = Self::render_to_string(view);
        self.frames += 1;
    }
}

fn heading(partition: Partition) -> &'static str {
    match partition {
        Partition::Incomplete => "Not finished",
        Partition::Complete => "Finished",
    }
}

/// トグル操作のラベル（押すと移る先の状態）
pub fn toggle_caption(book: &Book) -> &'static str {
    if book.is_complete() {
        "Mark unfinished"
    } else {
        "Mark finished"
    }
}

fn render_line(book: &Book, editing: bool) -> String {
    let mark = if book.is_complete() { "x" } else { " " };
    let suffix = if editing { " (editing)" } else { "" };
    let year = book
        .year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "year unknown".to_string());
    format!(
        "- [{}] {} by {} ({}) `{}` [{}]{}",
        mark,
        book.title(),
        book.author(),
        year,
        book.id(),
        toggle_caption(book),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::book::BookDraft;
    use crate::domain::model::id::BookId;

    fn book(id: i64, title: &str, is_complete: bool) -> Book {
        Book::new(
            BookId::from_raw(id),
            BookDraft {
                title: title.into(),
                author: "Someone".into(),
                year: 2020,
                is_complete,
            },
        )
    }

    #[test]
    fn splits_into_partitions() {
        let books = vec![book(1, "Open", false), book(2, "Done", true)];
        let out = MarkdownRenderer::render_to_string(&ShelfView::full(&books, None));
        let finished_at = out.find("## Finished").unwrap();
        assert!(out.find("Open").unwrap() < finished_at);
        assert!(out.find("Done").unwrap() > finished_at);
    }

    #[test]
    fn empty_shelf_shows_placeholders() {
        let out = MarkdownRenderer::render_to_string(&ShelfView::full(&[], None));
        assert_eq!(out.matches("_(empty)_").count(), 2);
    }

    #[test]
    fn render_keeps_last_frame_and_counts() {
        let books = vec![book(1, "Open", false)];
        let mut renderer = MarkdownRenderer::new();
        renderer.render(&ShelfView::full(&books, Some(BookId::from_raw(1))));
        renderer.render(&ShelfView::full(&books, None));
        assert_eq!(renderer.frame_count(), 2);
        assert!(!renderer.last_frame().contains("(editing)"));
    }

    #[test]
    fn unknown_year_is_labelled() {
        let book: Book = serde_json::from_str(
            r#"{"id":9,"title":"Lost","author":"Anon","year":null,"isComplete":false}"#,
        )
        .unwrap();
        let out = MarkdownRenderer::render_to_string(&ShelfView::full(&[book], None));
        assert!(out.contains("- [ ] Lost by Anon (year unknown) `9`"));
    }

    #[test]
    fn toggle_caption_points_to_other_partition() {
        assert_eq!(toggle_caption(&book(1, "a", false)), "Mark finished");
        assert_eq!(toggle_caption(&book(1, "a", true)), "Mark unfinished");
    }
}
