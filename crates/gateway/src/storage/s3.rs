//! # S3互換 メディアストレージ実装
//!
//! AWS S3, Wasabi, MinIO, Cloudflare R2 等のS3互換APIを使用する
//! メディアストレージ実装。

use std::collections::HashMap;

use s3::error::S3Error;

use super::{MediaStorage, ObjectMetadata};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::key::ObjectKey;

/// 署名付きURLごとに付与する一意なクエリパラメータ名。
/// 署名対象に含まれるため、同一秒内に発行したURL同士も区別できる。
pub const GRANT_ID_QUERY: &str = "x-grant-id";

/// S3互換ストレージによるメディアストレージ実装。
pub struct S3MediaStorage {
    bucket: s3::Bucket,
}

impl S3MediaStorage {
    /// S3互換バケットから構築する。
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// Gateway設定から構築する。
    /// 構築時にネットワーク通信は発生しない。
    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let region = s3::Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = s3::creds::Credentials::new(
            Some(config.access_key.as_str()),
            Some(config.secret_key.as_str()),
            None,
            None,
            None,
        )?;

        // パス形式（{endpoint}/{bucket}/{key}）
        let bucket = s3::Bucket::new(&config.bucket, region, credentials)?.with_path_style();

        tracing::info!(
            s3_endpoint = %config.endpoint,
            s3_region = %config.region,
            s3_bucket = %config.bucket,
            "S3互換ストレージを設定"
        );

        Ok(Self::new(*bucket))
    }
}

/// HeadObjectのエラーをGatewayエラーに写像する。
fn map_head_error(key: &ObjectKey, e: S3Error) -> GatewayError {
    match e {
        S3Error::HttpFailWithBody(status, body) => {
            GatewayError::from_backend_status(status, key, body)
        }
        S3Error::Credentials(e) => GatewayError::Signing(format!("認証情報の取得に失敗: {e}")),
        other => GatewayError::Unavailable(format!("HeadObject失敗: {other}")),
    }
}

#[async_trait::async_trait]
impl MediaStorage for S3MediaStorage {
    async fn head_object(&self, key: &ObjectKey) -> Result<ObjectMetadata, GatewayError> {
        let (meta, status) = self
            .bucket
            .head_object(key.as_str())
            .await
            .map_err(|e| map_head_error(key, e))?;

        // fail-on-err無効時はエラーステータスもOkで返る
        if !(200..300).contains(&status) {
            return Err(GatewayError::from_backend_status(status, key, String::new()));
        }

        let content_length = meta
            .content_length
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| {
                GatewayError::Unavailable(format!("{key}: Content-Lengthが返されませんでした"))
            })?;

        Ok(ObjectMetadata {
            content_type: meta.content_type,
            content_length,
            cache_control: meta.cache_control,
        })
    }

    async fn presign_get(
        &self,
        key: &ObjectKey,
        expiry_secs: u32,
    ) -> Result<String, GatewayError> {
        let mut queries = HashMap::new();
        queries.insert(
            GRANT_ID_QUERY.to_string(),
            uuid::Uuid::new_v4().to_string(),
        );

        self.bucket
            .presign_get(key.as_str(), expiry_secs, Some(queries))
            .await
            .map_err(|e| GatewayError::Signing(format!("署名付きダウンロードURL生成失敗: {e}")))
    }
}
