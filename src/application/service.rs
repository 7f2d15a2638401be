use tracing::{debug, warn};

use crate::domain::model::book::{Book, BookDraft, Partition};
use crate::domain::model::id::BookId;
use crate::domain::model::shelf::{Bookshelf, Mutation};
use crate::domain::renderer::{ShelfRenderer, ShelfView};
use crate::domain::repository::ShelfRepository;

use super::error::AppError;
use super::form::{BookForm, FormController, Submission};
use super::notifier::ChangeNotifier;

/// 本棚に対するユースケース。
/// コレクションはこのServiceが唯一所有し、変更のたびに描画 → 保存を行う。
pub struct ShelfService<R: ShelfRepository, V: ShelfRenderer> {
    shelf: Bookshelf,
    form: FormController,
    notifier: ChangeNotifier<R, V>,
}

impl<R: ShelfRepository, V: ShelfRenderer> ShelfService<R, V> {
    /// 永続化スロットから読み込んで起動する。
    ///
    /// スロットが空なら空の本棚。壊れたデータは警告を出して空から始め、
    /// 起動時の保存は行わない（最初の変更で上書きされる）。
    /// 読み込み自体の失敗（I/Oなど）は上書き事故を避けるためエラーで返す。
    pub fn open(repo: R, renderer: V) -> Result<Self, AppError> {
        let mut notifier = ChangeNotifier::new(repo, renderer);
        let loaded = notifier.repository().load();
        match loaded {
            Ok(books) => {
                let shelf = Bookshelf::from_books(books.unwrap_or_default());
                debug!(books = shelf.len(), "shelf loaded");
                notifier.publish(shelf.books(), None)?;
                Ok(Self::assemble(shelf, notifier))
            }
            Err(e) if R::is_malformed(&e) => {
                warn!(error = %e, "persisted shelf is unreadable, starting empty");
                let shelf = Bookshelf::new();
                notifier.render(&ShelfView::full(shelf.books(), None));
                Ok(Self::assemble(shelf, notifier))
            }
            Err(e) => Err(AppError::Storage(Box::new(e))),
        }
    }

    fn assemble(shelf: Bookshelf, notifier: ChangeNotifier<R, V>) -> Self {
        Self {
            shelf,
            form: FormController::new(),
            notifier,
        }
    }

    /// 本を追加する。
    pub fn add(&mut self, draft: BookDraft) -> Result<BookId, AppError> {
        let id = self.shelf.add(draft);
        debug!(%id, "book added");
        self.publish()?;
        Ok(id)
    }

    /// id以外を置き換える。存在しないIDは何もしない。
    pub fn update(&mut self, id: BookId, draft: BookDraft) -> Result<Mutation, AppError> {
        let outcome = self.shelf.update(id, draft);
        self.after(id, "update", outcome)
    }

    /// 読了状態を反転する。
    pub fn toggle(&mut self, id: BookId) -> Result<Mutation, AppError> {
        let outcome = self.shelf.toggle(id);
        self.after(id, "toggle", outcome)
    }

    /// 本を削除する。編集中の本なら編集モードも抜ける。
    pub fn delete(&mut self, id: BookId) -> Result<Mutation, AppError> {
        let outcome = self.shelf.delete(id);
        if outcome.is_applied() && self.form.editing() == Some(id) {
            self.form.finish();
        }
        self.after(id, "delete", outcome)
    }

    pub fn find(&self, id: BookId) -> Option<&Book> {
        self.shelf.find(id)
    }

    pub fn books(&self) -> &[Book] {
        self.shelf.books()
    }

    pub fn partition(&self, partition: Partition) -> Vec<&Book> {
        self.shelf.partition(partition)
    }

    /// タイトル検索。結果を描画するが、コレクションも永続化スロットも変更しない。
    pub fn search(&mut self, query: &str) -> Vec<Book> {
        let found = self.shelf.search(query);
        self.notifier
            .render(&ShelfView::filtered(&found, query, self.form.editing()));
        found
    }

    /// 全件を描画し直す（保存なし）。
    pub fn refresh(&mut self) {
        self.notifier
            .render(&ShelfView::full(self.shelf.books(), self.form.editing()));
    }

    // --- フォーム駆動の操作 ---

    /// 編集モードに入り、入力欄の初期値を返す。存在しないIDなら何もしない。
    pub fn begin_edit(&mut self, id: BookId) -> Option<BookForm> {
        let form = self.shelf.find(id).map(BookForm::from_book)?;
        self.form.begin(id);
        Some(form)
    }

    pub fn cancel_edit(&mut self) -> Option<BookId> {
        self.form.finish()
    }

    pub fn editing(&self) -> Option<BookId> {
        self.form.editing()
    }

    /// フォーム送信。編集モードなら更新、そうでなければ追加。
    /// 入力が不正な場合は編集モードを維持したままエラーを返す。
    pub fn submit(&mut self, form: &BookForm) -> Result<Submission, AppError> {
        let draft = form.parse()?;
        match self.form.finish() {
            Some(id) => {
                let outcome = self.update(id, draft)?;
                Ok(Submission::Updated(id, outcome))
            }
            None => {
                let id = self.add(draft)?;
                Ok(Submission::Added(id))
            }
        }
    }

    pub fn repository(&self) -> &R {
        self.notifier.repository()
    }

    pub fn renderer(&self) -> &V {
        self.notifier.renderer()
    }

    // --- private ---

    fn after(&mut self, id: BookId, op: &str, outcome: Mutation) -> Result<Mutation, AppError> {
        match outcome {
            Mutation::Applied => {
                debug!(%id, op, "book changed");
                self.publish()?;
            }
            Mutation::NotFound => debug!(%id, op, "book not found, ignored"),
        }
        Ok(outcome)
    }

    fn publish(&mut self) -> Result<(), AppError> {
        self.notifier
            .publish(self.shelf.books(), self.form.editing())
    }
}
