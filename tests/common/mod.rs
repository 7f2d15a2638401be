//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bookshelf_mcp::application::service::ShelfService;
use bookshelf_mcp::domain::model::book::{Book, BookDraft};
use bookshelf_mcp::domain::model::id::BookId;
use bookshelf_mcp::domain::renderer::{ShelfRenderer, ShelfView};
use bookshelf_mcp::domain::repository::ShelfRepository;
use bookshelf_mcp::infra::memory_store::MemoryStore;
use bookshelf_mcp::infra::slot::{KeyValueStore, SlotError, SlotRepository};

// =============================================================================
// Event log — 描画と保存の順序を記録する
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Render {
        ids: Vec<BookId>,
        query: Option<String>,
        editing: Option<BookId>,
    },
    Save(Vec<BookId>),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn events(log: &EventLog) -> Vec<Event> {
    log.lock().unwrap().clone()
}

pub fn saves(log: &EventLog) -> usize {
    events(log)
        .iter()
        .filter(|e| matches!(e, Event::Save(_)))
        .count()
}

pub fn renders(log: &EventLog) -> usize {
    events(log)
        .iter()
        .filter(|e| matches!(e, Event::Render { .. }))
        .count()
}

/// 受け取ったビューを記録するだけのRenderer
pub struct RecordingRenderer {
    log: EventLog,
}

impl ShelfRenderer for RecordingRenderer {
    fn render(&mut self, view: &ShelfView<'_>) {
        self.log.lock().unwrap().push(Event::Render {
            ids: view.books.iter().map(Book::id).collect(),
            query: view.query.map(String::from),
            editing: view.editing,
        });
    }
}

/// MemoryStore上のSlotRepositoryに委譲しつつ保存を記録するリポジトリ
pub struct RecordingRepo {
    inner: SlotRepository<MemoryStore>,
    log: EventLog,
}

impl ShelfRepository for RecordingRepo {
    type Error = SlotError;

    fn load(&self) -> Result<Option<Vec<Book>>, Self::Error> {
        self.inner.load()
    }

    fn save(&self, books: &[Book]) -> Result<(), Self::Error> {
        self.log
            .lock()
            .unwrap()
            .push(Event::Save(books.iter().map(Book::id).collect()));
        self.inner.save(books)
    }

    fn is_malformed(error: &Self::Error) -> bool {
        SlotRepository::<MemoryStore>::is_malformed(error)
    }
}

// =============================================================================
// Harness — Service + 共有ストア + ログ
// =============================================================================

pub struct Harness {
    pub service: ShelfService<RecordingRepo, RecordingRenderer>,
    pub store: MemoryStore,
    pub log: EventLog,
}

impl Harness {
    /// 空のストアから起動する。
    pub fn empty() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// 既にスロットへ書かれているストアから起動する。
    pub fn with_store(store: MemoryStore) -> Self {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let repo = RecordingRepo {
            inner: SlotRepository::with_default_key(store.clone()),
            log: log.clone(),
        };
        let renderer = RecordingRenderer { log: log.clone() };
        let service = ShelfService::open(repo, renderer).unwrap();
        Self {
            service,
            store,
            log,
        }
    }

    /// 起動時のイベントを捨てる。
    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }

    /// スロットの生の値
    pub fn slot(&self) -> Option<String> {
        self.store.get("books").unwrap()
    }

    /// スロットをデコードした値
    pub fn persisted(&self) -> Vec<Book> {
        serde_json::from_str(&self.slot().expect("slot written")).unwrap()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn draft(title: &str, author: &str, year: i64, is_complete: bool) -> BookDraft {
    BookDraft {
        title: title.into(),
        author: author.into(),
        year,
        is_complete,
    }
}

pub fn dune() -> BookDraft {
    draft("Dune", "Herbert", 1965, false)
}

/// 固定IDの標準的な本棚:
/// ```text
/// 1 Dune (Herbert, 1965)          not finished
/// 2 Neuromancer (Gibson, 1984)    finished
/// 3 Hyperion (Simmons, 1989)      not finished
/// ```
pub fn standard_books() -> Vec<Book> {
    vec![
        Book::new(BookId::from_raw(1), draft("Dune", "Herbert", 1965, false)),
        Book::new(
            BookId::from_raw(2),
            draft("Neuromancer", "Gibson", 1984, true),
        ),
        Book::new(
            BookId::from_raw(3),
            draft("Hyperion", "Simmons", 1989, false),
        ),
    ]
}

/// 標準の本棚が書かれたストア
pub fn standard_store() -> MemoryStore {
    let store = MemoryStore::new();
    SlotRepository::with_default_key(store.clone())
        .save(&standard_books())
        .unwrap();
    store
}
