//! フォーム境界。入力欄の生の値を `BookDraft` に変換し、編集モードを管理する。

use serde::{Deserialize, Serialize};

use crate::domain::model::book::{Book, BookDraft};
use crate::domain::model::id::BookId;
use crate::domain::model::shelf::Mutation;

use super::error::FormError;

/// フォーム入力欄の生の値
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year: String,
    pub is_complete: bool,
}

impl BookForm {
    /// 編集開始時に既存レコードで入力欄を埋める。
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title().to_string(),
            author: book.author().to_string(),
            year: book.year().map(|y| y.to_string()).unwrap_or_default(),
            is_complete: book.is_complete(),
        }
    }

    /// title/authorはtrimのみ。yearは先頭の整数部分を読む。
    pub fn parse(&self) -> Result<BookDraft, FormError> {
        Ok(BookDraft {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            year: parse_year(&self.year)?,
            is_complete: self.is_complete,
        })
    }

    /// 読了チェックに連動する送信ボタンの表示
    pub fn submit_label(&self) -> &'static str {
        if self.is_complete {
            "Finished"
        } else {
            "Not finished yet"
        }
    }
}

/// 先頭の空白と符号を許し、続く10進数字だけを読む（"1965abc" → 1965）。
pub fn parse_year(raw: &str) -> Result<i64, FormError> {
    let s = raw.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return Err(FormError::InvalidYear(raw.to_string()));
    }
    let signed = if negative {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    signed
        .parse()
        .map_err(|_| FormError::InvalidYear(raw.to_string()))
}

/// 送信の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Added(BookId),
    Updated(BookId, Mutation),
}

/// 編集モードの追跡。`Some` の間、送信は更新として扱われる。
#[derive(Debug, Clone, Default)]
pub struct FormController {
    editing: Option<BookId>,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing(&self) -> Option<BookId> {
        self.editing
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn begin(&mut self, id: BookId) {
        self.editing = Some(id);
    }

    /// 編集モードを抜け、編集していたIDを返す。
    pub fn finish(&mut self) -> Option<BookId> {
        self.editing.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_text_fields() {
        let form = BookForm {
            title: "  Dune ".into(),
            author: "\tHerbert\n".into(),
            year: "1965".into(),
            is_complete: false,
        };
        let draft = form.parse().unwrap();
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.author, "Herbert");
        assert_eq!(draft.year, 1965);
    }

    #[test]
    fn empty_title_is_accepted() {
        let form = BookForm {
            title: "   ".into(),
            year: "2001".into(),
            ..Default::default()
        };
        assert_eq!(form.parse().unwrap().title, "");
    }

    #[test]
    fn year_reads_leading_integer() {
        assert_eq!(parse_year(" 1965 ").unwrap(), 1965);
        assert_eq!(parse_year("1965abc").unwrap(), 1965);
        assert_eq!(parse_year("+42").unwrap(), 42);
        assert_eq!(parse_year("-500").unwrap(), -500);
        assert_eq!(parse_year("19.65").unwrap(), 19);
        assert_eq!(parse_year("-2147483648").unwrap(), -2_147_483_648);
        assert_eq!(parse_year("30000000000").unwrap(), 30_000_000_000);
        assert_eq!(parse_year("-9223372036854775808").unwrap(), i64::MIN);
    }

    #[test]
    fn year_without_digits_is_rejected() {
        for raw in ["", "abc", "-", " x1965", "99999999999999999999"] {
            assert!(
                matches!(parse_year(raw), Err(FormError::InvalidYear(_))),
                "expected rejection for {raw:?}"
            );
        }
    }

    #[test]
    fn unknown_year_prefills_blank() {
        let book: Book = serde_json::from_str(
            r#"{"id":3,"title":"Lost","author":"Anon","year":null,"isComplete":true}"#,
        )
        .unwrap();
        let form = BookForm::from_book(&book);
        assert_eq!(form.year, "");
        assert!(form.parse().is_err());
    }

    #[test]
    fn submit_label_follows_checkbox() {
        let mut form = BookForm::default();
        assert_eq!(form.submit_label(), "Not finished yet");
        form.is_complete = true;
        assert_eq!(form.submit_label(), "Finished");
    }

    #[test]
    fn controller_finish_leaves_edit_mode() {
        let mut ctl = FormController::new();
        assert!(!ctl.is_editing());
        ctl.begin(BookId::from_raw(7));
        assert_eq!(ctl.editing(), Some(BookId::from_raw(7)));
        assert_eq!(ctl.finish(), Some(BookId::from_raw(7)));
        assert!(!ctl.is_editing());
    }
}
