/// Todo API Lambdaエントリポイント
///
/// API Gateway / Function URL経由のHTTPリクエストをaxumルーターで処理する。
///
/// # 環境変数
/// - TODO_TABLE_NAME: Todoテーブル名（必須）
/// - STATUS_DATE_INDEX: ステータス・作成日時のGSI名（デフォルト: StatusDateIndex）
/// - DYNAMODB_ENDPOINT_URL: エンドポイント上書き（任意）
/// - RUST_LOG: ログレベル（デフォルト: info）
use lambda_http::{Error, run};
use todo_api::api::create_router;
use todo_api::infrastructure::{DynamoTodoRepository, TodoTableConfig, init_logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // DynamoDBクライアントはコールドスタート時に一度だけ作成し、全リクエストで共有
    let config = TodoTableConfig::from_env().await?;
    let repo = DynamoTodoRepository::from_config(&config);

    info!(
        table = config.table_name(),
        index = config.status_index(),
        "Todo API Lambda関数を初期化"
    );

    run(create_router(repo)).await
}
