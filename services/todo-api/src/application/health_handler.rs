// ヘルスチェックハンドラー
//
// テーブルのメタデータ取得でストアへの疎通を確認し、
// 結果をHealthReportとして返す。

use serde::Serialize;
use tracing::{error, info};

use crate::domain::Timestamp;
use crate::infrastructure::TodoRepository;

/// 全体の稼働状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// ストア接続状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseState {
    Connected,
    Disconnected,
}

/// ヘルスチェック結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: Timestamp,
    pub database: DatabaseState,
    /// 設定されているテーブル名
    pub table: String,
    /// 疎通失敗時のエラー内容
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// ヘルスチェックハンドラー
pub struct HealthHandler<R>
where
    R: TodoRepository,
{
    repo: R,
}

impl<R> HealthHandler<R>
where
    R: TodoRepository,
{
    /// 新しいハンドラーを作成
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// ストアへの疎通を確認してレポートを生成
    ///
    /// 疎通に失敗してもエラーにはせず、unhealthyのレポートを返す。
    pub async fn check(&self) -> HealthReport {
        let table = self.repo.table_name().to_string();

        match self.repo.check_connection().await {
            Ok(()) => {
                info!(table = %table, "ヘルスチェック成功");
                HealthReport {
                    status: HealthStatus::Healthy,
                    timestamp: Timestamp::now(),
                    database: DatabaseState::Connected,
                    table,
                    error: None,
                }
            }
            Err(e) => {
                error!(table = %table, error = %e, "ヘルスチェック失敗");
                HealthReport {
                    status: HealthStatus::Unhealthy,
                    timestamp: Timestamp::now(),
                    database: DatabaseState::Disconnected,
                    table,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
