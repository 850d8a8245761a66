//! # エンドポイントテスト用共通ヘルパー
//!
//! ストレージへの接続なしでGatewayを動かすためのモック群。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::key::ObjectKey;
use crate::storage::{MediaStorage, ObjectMetadata};

/// テスト用のモックMediaStorage。
///
/// 登録されたオブジェクトだけが存在し、署名付きURLは呼び出しごとに
/// 異なる連番を含むダミーを返す。
#[derive(Default)]
pub struct MockStorage {
    objects: HashMap<String, ObjectMetadata>,
    /// 全キーに対してこのステータスのエラーを返す
    fail_status: Option<u16>,
    calls: Arc<AtomicUsize>,
}

impl MockStorage {
    /// オブジェクトを登録する。
    pub fn with_object(mut self, key: &str, meta: ObjectMetadata) -> Self {
        self.objects.insert(key.to_string(), meta);
        self
    }

    /// 常に指定ステータスで失敗させる。
    pub fn failing_with(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    /// ストレージ呼び出し回数のカウンタ。
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl MediaStorage for MockStorage {
    async fn head_object(&self, key: &ObjectKey) -> Result<ObjectMetadata, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_status {
            return Err(GatewayError::from_backend_status(status, key, "mock failure"));
        }
        self.objects
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::from_backend_status(404, key, ""))
    }

    async fn presign_get(
        &self,
        key: &ObjectKey,
        expiry_secs: u32,
    ) -> Result<String, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_status {
            return Err(GatewayError::from_backend_status(status, key, "mock failure"));
        }
        Ok(format!(
            "https://mock-storage.example/media-bucket/{key}?X-Amz-Expires={expiry_secs}&X-Amz-Signature=sig{n}"
        ))
    }
}

/// `uploads/media/photo.jpg`（image/jpeg, 204800 bytes, Cache-Control無し）を持つモック。
pub fn photo_storage() -> MockStorage {
    MockStorage::default().with_object(
        "uploads/media/photo.jpg",
        ObjectMetadata {
            content_type: Some("image/jpeg".to_string()),
            content_length: 204800,
            cache_control: None,
        },
    )
}

/// テスト用GatewayStateを構築するヘルパー
pub fn test_state(storage: MockStorage) -> Arc<GatewayState> {
    Arc::new(GatewayState::new(Box::new(storage)))
}
