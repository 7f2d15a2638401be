use serde::{Deserialize, Deserializer, Serialize};

use super::id::BookId;

/// 本の追加・更新リクエスト（フォーム解析済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: i64,
    pub is_complete: bool,
}

/// 読了状態による区分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Incomplete,
    Complete,
}

impl Partition {
    pub fn of(is_complete: bool) -> Self {
        if is_complete {
            Self::Complete
        } else {
            Self::Incomplete
        }
    }
}

/// 本棚の1レコード。フィールド名は永続化スロットのJSON形式と一致させる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    /// 年が数値でなかったレコードは `None`（スロット上は `null`）
    #[serde(default, deserialize_with = "lenient_year")]
    year: Option<i64>,
    is_complete: bool,
}

impl Book {
    pub fn new(id: BookId, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            year: Some(draft.year),
            is_complete: draft.is_complete,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> Option<i64> {
        self.year
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn partition(&self) -> Partition {
        Partition::of(self.is_complete)
    }

    /// タイトルの部分一致（大文字小文字無視）
    pub fn title_matches(&self, lowered_query: &str) -> bool {
        self.title.to_lowercase().contains(lowered_query)
    }

    // --- 内部操作（Bookshelf経由でのみ呼ばれる） ---

    /// id以外の全フィールドを置き換える。
    pub(crate) fn apply(&mut self, draft: BookDraft) {
        self.title = draft.title;
        self.author = draft.author;
        self.year = Some(draft.year);
        self.is_complete = draft.is_complete;
    }

    pub(crate) fn toggle(&mut self) {
        self.is_complete = !self.is_complete;
    }
}

/// 元アプリは数値でない年を `NaN` として持ち、JSONには `null` と書く。
/// `null` と i64 に収まらない数値は `None` として読み、他のレコードを巻き添えにしない。
fn lenient_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(raw.and_then(|n| {
        n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        })
    }))
}
