//! # メディアストレージ
//!
//! Gatewayが利用するオブジェクトストレージの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

#[cfg(feature = "vendor-aws")]
pub mod s3;

#[cfg(feature = "vendor-aws")]
pub use self::s3::S3MediaStorage;

use crate::error::GatewayError;
use crate::key::ObjectKey;

/// ストレージが報告するオブジェクトのメタデータ。
/// リクエストごとに取得し、プロセス内ではキャッシュしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Content-Type（未設定の場合はNone）
    pub content_type: Option<String>,
    /// オブジェクトサイズ（バイト）
    pub content_length: u64,
    /// Cache-Control（未設定の場合はNone）
    pub cache_control: Option<String>,
}

/// メディアストレージの抽象インターフェース。
///
/// バケット名は実装の構築時に束縛される。S3互換ストレージ
/// （AWS S3, Wasabi, MinIO, Cloudflare R2等）やテスト用のモックを差し替えられる。
#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// オブジェクトのメタデータを取得する（HeadObject）。
    async fn head_object(&self, key: &ObjectKey) -> Result<ObjectMetadata, GatewayError>;

    /// 期限付きの署名付きダウンロードURL（GET）を生成する。
    ///
    /// 呼び出しごとに新しいURLを発行し、過去に発行したURLを再利用しない。
    async fn presign_get(&self, key: &ObjectKey, expiry_secs: u32)
        -> Result<String, GatewayError>;
}
