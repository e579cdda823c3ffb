//! 一覧取得件数（limitクエリパラメータ）
//!
//! 範囲外の値はエラーにせず丸める。

/// limit未指定時の件数
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// limitの上限
pub const MAX_LIST_LIMIT: u32 = 100;

/// 1ページあたりの取得件数（1..=100）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimit(u32);

impl ListLimit {
    /// クエリパラメータ文字列から件数を決定
    ///
    /// - 未指定、または整数として解釈できない場合は50
    /// - 100を超える値は100、1未満の値は1に丸める
    pub fn from_param(param: Option<&str>) -> Self {
        let Some(raw) = param.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        match raw.parse::<i64>() {
            Ok(value) => Self(value.clamp(1, MAX_LIST_LIMIT as i64) as u32),
            Err(_) => Self::default(),
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for ListLimit {
    fn default() -> Self {
        Self(DEFAULT_LIST_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_when_missing() {
        assert_eq!(ListLimit::from_param(None).get(), 50);
        assert_eq!(ListLimit::from_param(Some("")).get(), 50);
    }

    #[test]
    fn test_in_range_value_is_kept() {
        assert_eq!(ListLimit::from_param(Some("1")).get(), 1);
        assert_eq!(ListLimit::from_param(Some("25")).get(), 25);
        assert_eq!(ListLimit::from_param(Some("100")).get(), 100);
    }

    #[test]
    fn test_out_of_range_value_is_clamped() {
        assert_eq!(ListLimit::from_param(Some("101")).get(), 100);
        assert_eq!(ListLimit::from_param(Some("99999999999")).get(), 100);
        assert_eq!(ListLimit::from_param(Some("0")).get(), 1);
        assert_eq!(ListLimit::from_param(Some("-5")).get(), 1);
    }

    #[test]
    fn test_non_numeric_falls_back_to_default() {
        assert_eq!(ListLimit::from_param(Some("ten")).get(), 50);
        assert_eq!(ListLimit::from_param(Some("1.5")).get(), 50);
    }
}
