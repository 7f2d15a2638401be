use super::model::book::{Book, Partition};
use super::model::id::BookId;

/// 描画対象。全件またはフィルタ済みのサブセット。
#[derive(Debug, Clone, Copy)]
pub struct ShelfView<'a> {
    pub books: &'a [Book],
    /// 検索結果の描画なら検索語
    pub query: Option<&'a str>,
    /// 編集中の本
    pub editing: Option<BookId>,
}

impl<'a> ShelfView<'a> {
    pub fn full(books: &'a [Book], editing: Option<BookId>) -> Self {
        Self {
            books,
            query: None,
            editing,
        }
    }

    pub fn filtered(books: &'a [Book], query: &'a str, editing: Option<BookId>) -> Self {
        Self {
            books,
            query: Some(query),
            editing,
        }
    }

    pub fn partition(&self, partition: Partition) -> impl Iterator<Item = &'a Book> {
        let books = self.books;
        books.iter().filter(move |b| b.partition() == partition)
    }
}

/// 描画の抽象。Interface層が実装する。
pub trait ShelfRenderer {
    fn render(&mut self, view: &ShelfView<'_>);
}
