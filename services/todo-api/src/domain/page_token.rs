/// 一覧取得のページネーショントークン
///
/// ストアのLastEvaluatedKey（文字列属性のマップ）をJSON化し、
/// URLセーフBase64（パディングなし）でエンコードした不透明な文字列として扱う。
/// クライアントから受け取ったトークンが壊れている場合は`InvalidPageToken`を返し、
/// 呼び出し側で「カーソルなし」として扱う。
use std::collections::BTreeMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

use super::TodoStatus;

/// ページネーショントークンのデコードエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPageToken {
    /// Base64として不正
    #[error("page token is not valid base64")]
    Encoding,
    /// JSONとして不正
    #[error("page token payload is not a key map")]
    Payload,
    /// キーが空
    #[error("page token key is empty")]
    EmptyKey,
    /// 要求された一覧条件に合わないキー
    #[error("page token does not match the requested listing")]
    Mismatch,
}

/// ページネーショントークンのエンコードエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page token could not be encoded: {0}")]
pub struct PageTokenEncodeError(pub String);

/// テーブルスキャンの継続キー属性
const SCAN_KEY_ATTRIBUTES: [&str; 1] = ["todo_id"];

/// StatusDateIndexクエリの継続キー属性（昇順）
const STATUS_KEY_ATTRIBUTES: [&str; 3] = ["created_at", "status", "todo_id"];

/// ストアのページ継続キー
///
/// DynamoDBのLastEvaluatedKeyのうち、文字列属性のみを保持する。
/// テーブルスキャンでは`todo_id`、StatusDateIndexクエリでは
/// `todo_id`・`status`・`created_at`を含む。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageKey(BTreeMap<String, String>);

impl PageKey {
    pub fn new(attributes: BTreeMap<String, String>) -> Self {
        Self(attributes)
    }

    /// 指定属性の値を取得
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// 所有権を渡してマップを取り出す
    pub fn into_attributes(self) -> BTreeMap<String, String> {
        self.0
    }

    /// 一覧条件に対してキーが使えるか検証
    ///
    /// 属性の集合はキースキーマと完全一致していなければならない。
    /// - スキャン: `todo_id`のみ
    /// - ステータス指定: `todo_id`・`status`・`created_at`で、`status`が一致
    pub fn ensure_fits(&self, status: Option<TodoStatus>) -> Result<(), InvalidPageToken> {
        let expected: &[&str] = match status {
            None => &SCAN_KEY_ATTRIBUTES,
            Some(_) => &STATUS_KEY_ATTRIBUTES,
        };

        // BTreeMapのキーは昇順なので並びごと比較できる
        if !self.0.keys().map(String::as_str).eq(expected.iter().copied()) {
            return Err(InvalidPageToken::Mismatch);
        }

        if let Some(status) = status {
            if self.get("status") != Some(status.as_str()) {
                return Err(InvalidPageToken::Mismatch);
            }
        }

        Ok(())
    }
}

/// ページネーショントークンのエンコーダ/デコーダ
pub struct PageToken;

impl PageToken {
    /// 継続キーを不透明なトークン文字列にエンコード
    pub fn encode(key: &PageKey) -> Result<String, PageTokenEncodeError> {
        let json =
            serde_json::to_vec(&key.0).map_err(|e| PageTokenEncodeError(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// トークン文字列を継続キーにデコード
    pub fn decode(token: &str) -> Result<PageKey, InvalidPageToken> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| InvalidPageToken::Encoding)?;

        let attributes: BTreeMap<String, String> =
            serde_json::from_slice(&bytes).map_err(|_| InvalidPageToken::Payload)?;

        if attributes.is_empty() {
            return Err(InvalidPageToken::EmptyKey);
        }

        Ok(PageKey(attributes))
    }
}
