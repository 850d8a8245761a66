//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 設定は起動時に一度だけ読み込み、以後変更しない。

use std::fmt;

use crate::storage::MediaStorage;

/// 署名付きURLの有効期限（秒）
pub const PRESIGN_EXPIRY_SECS: u32 = 900;

/// ストレージがCache-Controlを返さない場合の既定値
pub const DEFAULT_CACHE_CONTROL: &str = "max-age=3600";

/// 待ち受けアドレスの既定値
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Gateway設定。
///
/// 認証情報を含むため、`Debug` 出力ではシークレットを伏せる。
#[derive(Clone)]
pub struct GatewayConfig {
    /// リージョン（`S3_REGION`）
    pub region: String,
    /// ストレージのエンドポイントURL（`S3_ENDPOINT`）
    pub endpoint: String,
    /// バケット名（`S3_BUCKET`）
    pub bucket: String,
    /// アクセスキーID（`S3_ACCESS_KEY`）
    pub access_key: String,
    /// シークレットアクセスキー（`S3_SECRET_KEY`）
    pub secret_key: String,
    /// 待ち受けアドレス（`GATEWAY_LISTEN_ADDR`、省略時 `0.0.0.0:3000`）
    pub listen_addr: String,
}

impl GatewayConfig {
    /// 環境変数から構築する。必須項目が欠けていれば起動を中止する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から構築する。
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &str| {
            read(name).ok_or_else(|| anyhow::anyhow!("環境変数 {name} が設定されていません"))
        };

        Ok(Self {
            region: required("S3_REGION")?,
            endpoint: required("S3_ENDPOINT")?,
            bucket: required("S3_BUCKET")?,
            access_key: required("S3_ACCESS_KEY")?,
            secret_key: required("S3_SECRET_KEY")?,
            listen_addr: read("GATEWAY_LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        })
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("listen_addr", &self.listen_addr)
            .finish()
    }
}

/// Gatewayの共有状態。
/// リクエスト間で共有されるが、読み取り専用。
pub struct GatewayState {
    /// メディアストレージ（S3互換等、トレイトで抽象化）
    pub storage: Box<dyn MediaStorage>,
    /// 署名付きURLの有効期限（秒）
    pub presign_expiry_secs: u32,
    /// ストレージがCache-Controlを返さない場合の既定値
    pub default_cache_control: String,
}

impl GatewayState {
    /// 既定の有効期限・Cache-Controlで構築する。
    pub fn new(storage: Box<dyn MediaStorage>) -> Self {
        Self {
            storage,
            presign_expiry_secs: PRESIGN_EXPIRY_SECS,
            default_cache_control: DEFAULT_CACHE_CONTROL.to_string(),
        }
    }
}
