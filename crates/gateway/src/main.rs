//! # Media Gateway
//!
//! S3互換オブジェクトストレージの前段に立つメディア配信Gateway。
//!
//! ## 役割
//! - リクエストパスからオブジェクトキーを導出・検証
//! - オブジェクトのメタデータ問い合わせ（存在確認）
//! - 期限付き署名付きURLの発行とリダイレクト
//!
//! オブジェクト本体は中継せず、クライアントはストレージから直接取得する。
//!
//! ## API エンドポイント
//! - `HEAD /{key}` — メタデータをヘッダーとして返却
//! - `* /{key}` — 署名付きURLへ302リダイレクト

mod config;
mod endpoints;
mod error;
mod key;
mod storage;

use std::sync::Arc;

use axum::routing::any;

use config::{GatewayConfig, GatewayState};
use endpoints::handle_media;
use storage::MediaStorage;

/// Gatewayのルーターを構築する。
fn build_router(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new()
        .route("/", any(handle_media))
        .route("/{*key}", any(handle_media))
        .with_state(state)
}

/// 設定からメディアストレージを構築する。
#[cfg(feature = "vendor-aws")]
fn build_storage(config: &GatewayConfig) -> anyhow::Result<Box<dyn MediaStorage>> {
    Ok(Box::new(storage::S3MediaStorage::from_config(config)?))
}

#[cfg(not(feature = "vendor-aws"))]
fn build_storage(_config: &GatewayConfig) -> anyhow::Result<Box<dyn MediaStorage>> {
    anyhow::bail!("ストレージ実装が有効化されていません（vendor-aws feature が必要です）")
}

/// Ctrl-Cを受けたら新規接続の受付を止め、処理中のリクエストの完了を待つ。
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シグナルハンドラの登録に失敗: {}", e);
        return;
    }
    tracing::info!("シャットダウンを開始します");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // 環境変数の読み込み（必須項目が欠けていればここで終了）
    let config = GatewayConfig::from_env()?;
    tracing::debug!(config = ?config, "設定を読み込みました");

    let storage = build_storage(&config)?;
    let state = Arc::new(GatewayState::new(storage));

    let app = build_router(state);

    tracing::info!("Gatewayを {} で起動します", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
