//! ローカル開発用HTTPサーバー
//!
//! Lambdaと同じルーターをaxum::serveで起動する。
//! DynamoDB Localを使う場合は`DYNAMODB_ENDPOINT_URL`を設定する。
//!
//! ```bash
//! export TODO_TABLE_NAME=todos-dev
//! export DYNAMODB_ENDPOINT_URL=http://localhost:8000
//! cargo run --bin local_server -- --addr 127.0.0.1:3000
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tokio::signal;
use todo_api::api::create_router;
use todo_api::infrastructure::{DynamoTodoRepository, TodoTableConfig, init_logging};
use tracing::{error, info};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "local_server")]
#[command(about = "Todo APIをローカルで起動")]
struct CliArgs {
    /// リッスンアドレス
    #[arg(long, env = "TODO_API_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
}

/// シャットダウンシグナルを待機する
///
/// SIGTERMまたはCtrl+C (SIGINT) のいずれかを受信したらリターンする。
/// シグナルハンドラーを登録できなかった場合、そのシグナルは待機しない。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C シグナルハンドラーの登録に失敗");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM シグナルハンドラーの登録に失敗");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C (SIGINT) を受信しました。graceful shutdownを開始します");
        }
        _ = terminate => {
            info!("SIGTERM を受信しました。graceful shutdownを開始します");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging();

    let args = CliArgs::parse();

    let config = TodoTableConfig::from_env().await?;
    let repo = DynamoTodoRepository::from_config(&config);
    let app = create_router(repo);

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, table = config.table_name(), "リッスン開始");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("サーバーが正常に停止しました");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_addr_argument() {
        let args = CliArgs::try_parse_from(["local_server", "--addr", "0.0.0.0:3000"]).unwrap();
        assert_eq!(args.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_cli_rejects_invalid_addr() {
        assert!(CliArgs::try_parse_from(["local_server", "--addr", "not-an-addr"]).is_err());
    }
}
