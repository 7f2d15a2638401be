//! 起動設定。CLI引数と環境変数から一度だけ解決し、明示的に渡す。
//!
//! | 項目 | 解決順 | 既定値 |
//! |------|--------|--------|
//! | `storage_dir` | 第1引数 → `BOOKSHELF_DIR` | `.` |
//! | `storage_key` | `BOOKSHELF_KEY` | `books` |
//!
//! ログフィルタは `BOOKSHELF_LOG`（`tracing_subscriber::EnvFilter` 形式）。

use std::path::PathBuf;

use crate::infra::slot::DEFAULT_SLOT_KEY;

pub const DIR_ENV: &str = "BOOKSHELF_DIR";
pub const KEY_ENV: &str = "BOOKSHELF_KEY";
pub const LOG_ENV: &str = "BOOKSHELF_LOG";
pub const DEFAULT_LOG_FILTER: &str = "bookshelf_mcp=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    /// 永続化ファイルを置くディレクトリ
    pub storage_dir: PathBuf,
    /// スロットのキー（`<storage_dir>/<key>.json`）
    pub storage_key: String,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("."),
            storage_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl ShelfConfig {
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().nth(1), |name| std::env::var(name).ok())
    }

    pub fn resolve(arg: Option<String>, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |v: String| if v.trim().is_empty() { None } else { Some(v) };
        Self {
            storage_dir: arg
                .and_then(non_empty)
                .or_else(|| env(DIR_ENV).and_then(non_empty))
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            storage_key: env(KEY_ENV)
                .and_then(non_empty)
                .unwrap_or(defaults.storage_key),
        }
    }
}
