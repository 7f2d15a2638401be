use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 本のID。永続化スロット上ではミリ秒タイムスタンプ由来の整数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// 単調増加のIDアロケータ。
///
/// 現在時刻（ミリ秒）を基準にしつつ、直前に払い出したIDより必ず大きい値を返す。
/// 同一ミリ秒内の連続追加でも衝突しない。
/// `i64::MAX` を払い出した後は `None` を返す（呼び出し側で空きIDを探す）。
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: i64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存IDの最大値から再開する（ロード直後用）
    pub fn seeded(existing: impl IntoIterator<Item = BookId>) -> Self {
        let last = existing.into_iter().map(BookId::get).max().unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self) -> Option<BookId> {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    pub(crate) fn next_at(&mut self, now_millis: i64) -> Option<BookId> {
        let id = now_millis.max(self.last.checked_add(1)?);
        self.last = id;
        Some(BookId(id))
    }
}
