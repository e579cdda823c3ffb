/// DynamoDB接続設定
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// Todoテーブル名の環境変数
pub const TODO_TABLE_NAME_ENV: &str = "TODO_TABLE_NAME";

/// GSI名の環境変数
pub const STATUS_DATE_INDEX_ENV: &str = "STATUS_DATE_INDEX";

/// DynamoDBエンドポイント上書き用の環境変数（DynamoDB Local等）
pub const DYNAMODB_ENDPOINT_URL_ENV: &str = "DYNAMODB_ENDPOINT_URL";

/// GSI名のデフォルト値
pub const DEFAULT_STATUS_DATE_INDEX: &str = "StatusDateIndex";

/// 設定読み込みのエラー型
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// テーブル名とクライアントを持つDynamoDB設定
///
/// プロセス起動時に一度だけ作成し、リポジトリに渡して使い回す。
/// 環境変数:
/// - TODO_TABLE_NAME: Todoテーブル名（必須）
/// - STATUS_DATE_INDEX: ステータス・作成日時のGSI名（デフォルト: StatusDateIndex）
/// - DYNAMODB_ENDPOINT_URL: エンドポイント上書き（任意）
#[derive(Debug, Clone)]
pub struct TodoTableConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// Todoテーブル名
    table_name: String,
    /// GSI名
    status_index: String,
}

/// 環境変数から読み込んだテーブル設定（クライアント作成前）
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableSettings {
    table_name: String,
    status_index: String,
    endpoint_url: Option<String>,
}

impl TableSettings {
    /// 任意の値取得関数から設定を組み立てる
    fn load(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table_name = get(TODO_TABLE_NAME_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(TODO_TABLE_NAME_ENV.to_string()))?;

        let status_index = get(STATUS_DATE_INDEX_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS_DATE_INDEX.to_string());

        let endpoint_url = get(DYNAMODB_ENDPOINT_URL_ENV).filter(|v| !v.trim().is_empty());

        Ok(Self {
            table_name,
            status_index,
            endpoint_url,
        })
    }
}

impl TodoTableConfig {
    /// 環境からAWS設定を読み込み、環境変数からテーブル名を読み取って新しいTodoTableConfigを作成
    ///
    /// AWS認証情報・リージョンはaws-configのデフォルトプロバイダーチェーンから取得する。
    pub async fn from_env() -> Result<Self, ConfigError> {
        let settings = TableSettings::load(|key| std::env::var(key).ok())?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(endpoint_url) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let aws_config = loader.load().await;

        Ok(Self {
            client: DynamoDbClient::new(&aws_config),
            table_name: settings.table_name,
            status_index: settings.status_index,
        })
    }

    /// 明示的な値で新しいTodoTableConfigを作成（テスト用）
    pub fn new(client: DynamoDbClient, table_name: String, status_index: String) -> Self {
        Self {
            client,
            table_name,
            status_index,
        }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// Todoテーブル名を取得
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// GSI名を取得
    pub fn status_index(&self) -> &str {
        &self.status_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    // テストで環境変数を安全に設定/削除するヘルパー
    // 注: Rust 2024エディションでset_var/remove_varはunsafe
    unsafe fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    unsafe fn cleanup_env() {
        unsafe {
            remove_env(TODO_TABLE_NAME_ENV);
            remove_env(STATUS_DATE_INDEX_ENV);
            remove_env(DYNAMODB_ENDPOINT_URL_ENV);
        }
    }

    fn settings_from(pairs: &[(&str, &str)]) -> Result<TableSettings, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TableSettings::load(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_env_var_error_display() {
        let error = ConfigError::MissingEnvVar("TEST_VAR".to_string());
        assert_eq!(error.to_string(), "Missing environment variable: TEST_VAR");
    }

    #[test]
    fn test_settings_require_table_name() {
        let result = settings_from(&[]);
        match result {
            Err(ConfigError::MissingEnvVar(var)) => assert_eq!(var, "TODO_TABLE_NAME"),
            Ok(_) => panic!("TODO_TABLE_NAMEなしで成功してはいけない"),
        }

        assert!(settings_from(&[(TODO_TABLE_NAME_ENV, "  ")]).is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = settings_from(&[(TODO_TABLE_NAME_ENV, "todos-dev")]).unwrap();
        assert_eq!(settings.table_name, "todos-dev");
        assert_eq!(settings.status_index, "StatusDateIndex");
        assert_eq!(settings.endpoint_url, None);
    }

    #[test]
    fn test_settings_overrides() {
        let settings = settings_from(&[
            (TODO_TABLE_NAME_ENV, "todos-prod"),
            (STATUS_DATE_INDEX_ENV, "ByStatus"),
            (DYNAMODB_ENDPOINT_URL_ENV, "http://localhost:8000"),
        ])
        .unwrap();

        assert_eq!(settings.status_index, "ByStatus");
        assert_eq!(settings.endpoint_url.as_deref(), Some("http://localhost:8000"));
    }

    #[tokio::test]
    async fn test_config_new_getters() {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        let config = TodoTableConfig::new(client, "test-todos".to_string(), "Idx".to_string());

        assert_eq!(config.table_name(), "test-todos");
        assert_eq!(config.status_index(), "Idx");
        let _client_ref = config.client();
    }

    #[tokio::test]
    #[serial(todo_env)]
    async fn test_from_env_scenarios() {
        // --- TODO_TABLE_NAMEが欠落 ---
        unsafe { cleanup_env() };
        let result = TodoTableConfig::from_env().await;
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));

        // --- 必須のみ設定 ---
        unsafe {
            cleanup_env();
            set_env(TODO_TABLE_NAME_ENV, "env-todos");
            set_env(DYNAMODB_ENDPOINT_URL_ENV, "http://localhost:8000");
        }
        let config = TodoTableConfig::from_env().await.unwrap();
        assert_eq!(config.table_name(), "env-todos");
        assert_eq!(config.status_index(), DEFAULT_STATUS_DATE_INDEX);

        unsafe { cleanup_env() };
    }
}
