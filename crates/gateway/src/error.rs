//! # Gateway エラー型
//!
//! ストレージ側のエラーは握りつぶさず、対応するHTTPステータスに写像する。
//! レスポンスはステータスと標準ヘッダーのみで、ボディは付けない。
//! HEADへの応答でContent-Lengthが付かないよう、ボディはサイズ不明の空ストリームにする。

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::http::StatusCode;

use crate::key::{InvalidKey, ObjectKey};

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// ストレージ問い合わせ前に拒否されたキー
    #[error("不正なオブジェクトキー: {0}")]
    InvalidKey(#[from] InvalidKey),
    /// オブジェクトが存在しない
    #[error("オブジェクトが存在しません: {0}")]
    NotFound(String),
    /// ストレージが認証・認可エラーを返した
    #[error("ストレージへのアクセスが拒否されました: {0}")]
    AccessDenied(String),
    /// ストレージがその他のエラーステータスを返した
    #[error("ストレージがエラーを返しました: HTTP {status} - {message}")]
    Backend {
        /// ストレージが返したHTTPステータス
        status: u16,
        /// エラー詳細
        message: String,
    },
    /// ストレージから有効な応答を得られない（通信失敗・不正な応答）
    #[error("ストレージから有効な応答を得られません: {0}")]
    Unavailable(String),
    /// 署名付きURLの生成に失敗
    #[error("署名付きURL生成に失敗: {0}")]
    Signing(String),
}

impl GatewayError {
    /// ストレージが返したHTTPステータスからエラーを構築する。
    pub fn from_backend_status(status: u16, key: &ObjectKey, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => GatewayError::NotFound(key.to_string()),
            401 | 403 => GatewayError::AccessDenied(format!("{key}: HTTP {status}")),
            400..=599 => GatewayError::Backend { status, message },
            _ => GatewayError::Unavailable(format!("想定外のHTTPステータス {status}: {message}")),
        }
    }

    /// 対応するHTTPステータス。
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::AccessDenied(_) => StatusCode::FORBIDDEN,
            GatewayError::Backend { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            GatewayError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        // 空ボディ（サイズ0が確定）だとhyperが `content-length: 0` を付ける
        let body = Body::from_stream(futures::stream::empty::<Result<Bytes, Infallible>>());
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::HttpBody;
    use axum::response::IntoResponse;

    use super::*;
    use crate::key::derive_key;

    #[test]
    fn test_backend_status_mapping() {
        let key = derive_key("/missing/file.png").unwrap();

        let err = GatewayError::from_backend_status(404, &key, "");
        assert!(matches!(err, GatewayError::NotFound(ref k) if k == "missing/file.png"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = GatewayError::from_backend_status(403, &key, "AccessDenied");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        let err = GatewayError::from_backend_status(401, &key, "");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = GatewayError::from_backend_status(503, &key, "SlowDown");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let err = GatewayError::from_backend_status(400, &key, "InvalidRequest");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        // リダイレクト等はエラーとして扱えないので502
        let err = GatewayError::from_backend_status(301, &key, "PermanentRedirect");
        assert!(matches!(err, GatewayError::Unavailable(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_local_errors_status() {
        assert_eq!(
            GatewayError::InvalidKey(InvalidKey::Traversal).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Unavailable("connection refused".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::Signing("no credentials".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    /// エラーレスポンスはボディもContent-Lengthも持たない
    #[test]
    fn test_error_response_has_no_body_headers() {
        let response = GatewayError::NotFound("missing/file.png".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(axum::http::header::CONTENT_LENGTH).is_none());
        assert!(response.headers().get(axum::http::header::CONTENT_TYPE).is_none());
        // サイズが確定していればサーバーがContent-Lengthを補ってしまう
        assert_eq!(response.body().size_hint().exact(), None);
    }
}
