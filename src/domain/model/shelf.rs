use std::collections::HashSet;

use super::book::{Book, BookDraft, Partition};
use super::id::{BookId, IdAllocator};

/// 変更操作の結果。存在しないIDへの操作はエラーではなく `NotFound` として無視する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    NotFound,
}

impl Mutation {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Bookshelf — 集約ルート。本のコレクションは挿入順を保つ。
#[derive(Debug, Clone, Default)]
pub struct Bookshelf {
    books: Vec<Book>,
    ids: IdAllocator,
}

impl Bookshelf {
    pub fn new() -> Self {
        Self::default()
    }

    /// 永続化済みのコレクションから復元する。IDの払い出しは既存の最大値の後から。
    pub fn from_books(books: Vec<Book>) -> Self {
        let ids = IdAllocator::seeded(books.iter().map(Book::id));
        Self { books, ids }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn find(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id() == id)
    }

    pub fn partition(&self, partition: Partition) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|b| b.partition() == partition)
            .collect()
    }

    /// タイトル部分一致検索（大文字小文字無視）。空クエリは全件。
    pub fn search(&self, query: &str) -> Vec<Book> {
        let query = query.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.title_matches(&query))
            .cloned()
            .collect()
    }

    pub fn add(&mut self, draft: BookDraft) -> BookId {
        let id = match self.ids.next_id() {
            Some(id) => id,
            None => self.lowest_free_id(),
        };
        self.books.push(Book::new(id, draft));
        id
    }

    /// id以外を置き換える。位置は変わらない。
    pub fn update(&mut self, id: BookId, draft: BookDraft) -> Mutation {
        match self.books.iter_mut().find(|b| b.id() == id) {
            Some(book) => {
                book.apply(draft);
                Mutation::Applied
            }
            None => Mutation::NotFound,
        }
    }

    pub fn toggle(&mut self, id: BookId) -> Mutation {
        match self.books.iter_mut().find(|b| b.id() == id) {
            Some(book) => {
                book.toggle();
                Mutation::Applied
            }
            None => Mutation::NotFound,
        }
    }

    pub fn delete(&mut self, id: BookId) -> Mutation {
        match self.books.iter().position(|b| b.id() == id) {
            Some(index) => {
                self.books.remove(index);
                Mutation::Applied
            }
            None => Mutation::NotFound,
        }
    }

    /// 払い出しが上限に達したときの退避先。使われていない最小の正のID。
    fn lowest_free_id(&self) -> BookId {
        let used: HashSet<i64> = self.books.iter().map(|b| b.id().get()).collect();
        let free = (1..=i64::MAX).find(|n| !used.contains(n)).unwrap_or(0);
        BookId::from_raw(free)
    }
}
