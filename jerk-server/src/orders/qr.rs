//! 订单二维码链接
//!
//! 二维码内容为 `<PUBLIC_ORIGIN>/order?id=<orderId>`，司机扫码后打开订单页。
//! 图片渲染在前端完成，这里只生成和解析链接。

use shared::error::{AppError, AppResult, ErrorCode};
use url::Url;

/// Build the order page URL encoded into the QR code
pub fn order_url(public_origin: &str, order_id: &str) -> AppResult<String> {
    let mut url = Url::parse(public_origin).map_err(|e| {
        AppError::with_message(
            ErrorCode::ConfigError,
            format!("Invalid public origin {public_origin}: {e}"),
        )
    })?;

    url.path_segments_mut()
        .map_err(|_| {
            AppError::with_message(
                ErrorCode::ConfigError,
                format!("Public origin cannot be a base URL: {public_origin}"),
            )
        })?
        .pop_if_empty()
        .push("order");
    url.query_pairs_mut().clear().append_pair("id", order_id);
    url.set_fragment(None);

    Ok(url.into())
}

/// Extract the order id from a scanned URL
///
/// Returns `None` unless the last path segment is `order` and a non-empty
/// `id` query parameter is present.
pub fn parse_order_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let last = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    if last != "order" {
        return None;
    }
    url.query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_url() {
        assert_eq!(
            order_url("http://localhost:3000", "abc-123").unwrap(),
            "http://localhost:3000/order?id=abc-123"
        );
        assert_eq!(
            order_url("https://jerk.example.com/app/", "x").unwrap(),
            "https://jerk.example.com/app/order?id=x"
        );
    }

    #[test]
    fn test_round_trip_with_reserved_characters() {
        let id = "a b&c=d";
        let url = order_url("https://jerk.example.com", id).unwrap();
        assert!(!url.contains(' '));
        assert_eq!(parse_order_url(&url).as_deref(), Some(id));
    }

    #[test]
    fn test_parse_rejects_foreign_urls() {
        assert_eq!(parse_order_url("https://x.com/orders?id=1"), None);
        assert_eq!(parse_order_url("https://x.com/order"), None);
        assert_eq!(parse_order_url("https://x.com/order?id="), None);
        assert_eq!(parse_order_url("not a url"), None);
        assert_eq!(
            parse_order_url("https://x.com/order?ref=qr&id=42").as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_bad_origin_is_config_error() {
        let err = order_url("::nope", "1").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
        let err = order_url("mailto:chef@jerk.com", "1").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }
}
