use super::model::book::Book;

/// 永続化の抽象。Infra層が実装する。
pub trait ShelfRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// スロットが空なら `None`。
    fn load(&self) -> Result<Option<Vec<Book>>, Self::Error>;
    /// コレクション全体で上書きする。
    fn save(&self, books: &[Book]) -> Result<(), Self::Error>;

    /// 読み込みエラーが「中身が壊れている」ことによるものか。
    /// `true` のときだけ呼び出し側は空の本棚で起動してよい。I/O失敗などは `false`。
    fn is_malformed(_error: &Self::Error) -> bool {
        false
    }
}
