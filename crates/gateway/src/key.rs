//! # オブジェクトキー導出
//!
//! リクエストパスからバケット内のオブジェクトキーを導出する。
//!
//! ## 導出規則
//! 1. 先頭の `/` を1つだけ取り除く
//! 2. 残りをパーセントデコードする（1回のみ）
//! 3. デコード後の文字列を検証する
//!
//! デコード済みの文字列がそのままキーになる。署名付きURL生成時の
//! URIエンコードはストレージクライアント側で1回だけ行われるため、
//! `a%20b` と `a b` はどちらも同じキー `a b` を指す。

use std::fmt;

use percent_encoding::percent_decode_str;

/// オブジェクトキーの最大長（バイト）。S3のキー長上限に合わせる。
pub const MAX_KEY_BYTES: usize = 1024;

/// キー導出の失敗理由。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidKey {
    /// キーが空
    #[error("キーが空です")]
    Empty,
    /// パーセントデコード結果がUTF-8ではない
    #[error("キーが不正なエンコーディングを含んでいます")]
    Encoding,
    /// 長さ超過
    #[error("キーが長すぎます: {0} bytes (上限: {max} bytes)", max = MAX_KEY_BYTES)]
    TooLong(usize),
    /// 制御文字を含む
    #[error("キーが制御文字を含んでいます")]
    ControlCharacter,
    /// 空のパスセグメント（`a//b`、末尾の `/` 等）
    #[error("キーが空のセグメントを含んでいます")]
    EmptySegment,
    /// `.` / `..` セグメントによるパストラバーサル
    #[error("キーがパストラバーサルを含んでいます")]
    Traversal,
}

/// 検証済みのオブジェクトキー。
///
/// `derive_key` 以外では構築できない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// キー文字列を返す。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// リクエストパスからオブジェクトキーを導出する。
///
/// ストレージへの問い合わせ前に呼ばれ、ここで拒否されたキーが
/// バックエンドに渡ることはない。
pub fn derive_key(path: &str) -> Result<ObjectKey, InvalidKey> {
    let raw = path.strip_prefix('/').unwrap_or(path);

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| InvalidKey::Encoding)?;

    if decoded.is_empty() {
        return Err(InvalidKey::Empty);
    }
    if decoded.len() > MAX_KEY_BYTES {
        return Err(InvalidKey::TooLong(decoded.len()));
    }
    if decoded.chars().any(char::is_control) {
        return Err(InvalidKey::ControlCharacter);
    }

    // `\` もセグメント区切りとして扱う
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" => return Err(InvalidKey::EmptySegment),
            "." | ".." => return Err(InvalidKey::Traversal),
            _ => {}
        }
    }

    Ok(ObjectKey(decoded.into_owned()))
}
