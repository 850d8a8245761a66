//! # Gatewayエンドポイント

pub mod media;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use media::handle_media;
