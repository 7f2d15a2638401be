use tracing::debug;

use crate::domain::model::book::Book;
use crate::domain::model::id::BookId;
use crate::domain::renderer::{ShelfRenderer, ShelfView};
use crate::domain::repository::ShelfRepository;

use super::error::AppError;

/// 「コレクションが変わった」ことへの反応を1箇所にまとめる。
///
/// `publish` は必ず (1) 描画 (2) 永続化 の順で、呼び出し元に戻る前に完了する。
/// 合成や遅延はしない: N回の変更でN回の描画と保存が走る。
pub struct ChangeNotifier<R, V> {
    repo: R,
    renderer: V,
}

impl<R: ShelfRepository, V: ShelfRenderer> ChangeNotifier<R, V> {
    pub fn new(repo: R, renderer: V) -> Self {
        Self { repo, renderer }
    }

    pub fn publish(&mut self, books: &[Book], editing: Option<BookId>) -> Result<(), AppError> {
        self.renderer.render(&ShelfView::full(books, editing));
        self.repo
            .save(books)
            .map_err(|e| AppError::Storage(Box::new(e)))?;
        debug!(books = books.len(), "shelf rendered and persisted");
        Ok(())
    }

    /// 描画のみ（検索結果など、永続化しないビュー）
    pub fn render(&mut self, view: &ShelfView<'_>) {
        self.renderer.render(view);
        debug!(books = view.books.len(), query = ?view.query, "shelf rendered");
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn renderer(&self) -> &V {
        &self.renderer
    }
}
