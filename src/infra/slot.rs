use crate::domain::model::book::Book;
use crate::domain::repository::ShelfRepository;

/// コレクションを保存するスロットの既定キー
pub const DEFAULT_SLOT_KEY: &str = "books";

/// 文字列キー → 文字列値のストア。
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 1スロットにコレクション全体をJSON配列として保存するShelfRepository実装。
pub struct SlotRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SlotRepository<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn with_default_key(store: S) -> Self {
        Self::new(store, DEFAULT_SLOT_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<S: KeyValueStore> ShelfRepository for SlotRepository<S> {
    type Error = SlotError;

    fn load(&self) -> Result<Option<Vec<Book>>, Self::Error> {
        let raw = self
            .store
            .get(&self.key)
            .map_err(|e| SlotError::Store(Box::new(e)))?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, books: &[Book]) -> Result<(), Self::Error> {
        let raw = serde_json::to_string(books)?;
        self.store
            .set(&self.key, &raw)
            .map_err(|e| SlotError::Store(Box::new(e)))
    }

    fn is_malformed(error: &Self::Error) -> bool {
        matches!(error, SlotError::Json(_))
    }
}
