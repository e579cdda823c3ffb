/// Todoのタイムスタンプ
///
/// `YYYY-MM-DDTHH:MM:SS.ffffffZ` 形式（UTC、マイクロ秒精度、固定長）で保存する。
/// created_atはStatusDateIndexのソートキーになるため、
/// 文字列の辞書順と時刻順が一致する固定長フォーマットである必要がある。
use std::fmt;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 保存・レスポンス用フォーマット
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// UTCタイムスタンプ（マイクロ秒精度）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// 現在時刻をマイクロ秒精度に切り詰めて取得
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// 任意の日時から作成（マイクロ秒未満は切り捨て）
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(6))
    }

    /// 内部のDateTimeを取得
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// 文字列からパース
    ///
    /// 固定長フォーマットに加え、RFC 3339形式や末尾`Z`のない
    /// ISO 8601形式（既存レコード用）も受け付ける。
    pub fn parse(value: &str) -> Option<Self> {
        if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
            return Some(Self::from_datetime(datetime.with_timezone(&Utc)));
        }

        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Self::from_datetime(naive.and_utc()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Timestamp::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", value)))
    }
}
