//! # /{key}
//!
//! メディア配信エンドポイント。
//!
//! - `HEAD /{key}` — オブジェクトのメタデータをヘッダーとして返す（存在確認）
//! - その他のメソッド — 署名付きダウンロードURLへ302でリダイレクトする
//!
//! Gateway自身はオブジェクト本体を中継しない。

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::key::{derive_key, ObjectKey};

/// ストレージがContent-Typeを返さない場合の既定値
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 全メソッド共通のハンドラ。
///
/// パスからキーを導出し、HEADならHeadObject、それ以外なら署名付きURLの発行を
/// ストレージに1回だけ問い合わせる。クエリ文字列は無視する。
pub async fn handle_media(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
) -> Result<Response, GatewayError> {
    let key = derive_key(uri.path()).map_err(|e| {
        tracing::warn!(path = %uri.path(), error = %e, "不正なオブジェクトキーを拒否");
        GatewayError::from(e)
    })?;

    let result = if method == Method::HEAD {
        head_response(&state, &key).await
    } else {
        redirect_response(&state, &key).await
    };

    result.inspect_err(|e| {
        tracing::warn!(
            method = %method,
            key = %key,
            status = e.status_code().as_u16(),
            error = %e,
            "ストレージ操作に失敗"
        );
    })
}

/// HEAD — メタデータをヘッダーとして返す。
async fn head_response(state: &GatewayState, key: &ObjectKey) -> Result<Response, GatewayError> {
    let meta = state.storage.head_object(key).await?;

    let content_type = meta.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);
    let cache_control = meta
        .cache_control
        .as_deref()
        .unwrap_or(&state.default_cache_control);

    tracing::debug!(key = %key, content_length = meta.content_length, "HeadObject成功");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, backend_header_value(key, content_type)?),
            (header::CONTENT_LENGTH, HeaderValue::from(meta.content_length)),
            (header::CACHE_CONTROL, backend_header_value(key, cache_control)?),
        ],
    )
        .into_response())
}

/// HEAD以外 — 署名付きURLを発行して302でリダイレクトする。
async fn redirect_response(
    state: &GatewayState,
    key: &ObjectKey,
) -> Result<Response, GatewayError> {
    let url = state
        .storage
        .presign_get(key, state.presign_expiry_secs)
        .await?;

    let location = HeaderValue::from_str(&url)
        .map_err(|e| GatewayError::Signing(format!("署名付きURLがヘッダー値として不正: {e}")))?;

    tracing::debug!(key = %key, expiry_secs = state.presign_expiry_secs, "署名付きURLを発行");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// ストレージが返した値をヘッダー値に変換する。
fn backend_header_value(key: &ObjectKey, value: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(value).map_err(|e| {
        GatewayError::Unavailable(format!("{key}: ストレージが不正なヘッダー値を返しました: {e}"))
    })
}
