//! Security response headers
//!
//! Applied to every response:
//!
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options: DENY`
//! - `Referrer-Policy: strict-origin-when-cross-origin`
//! - `Permissions-Policy` disabling sensors and payment APIs
//! - `Content-Security-Policy`, whose `img-src` also allows the blob
//!   storage origin so uploaded photos render
//! - `Strict-Transport-Security` in production only

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::config::Config;

/// Precomputed security header values
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    content_security_policy: HeaderValue,
    hsts: bool,
}

const BASE_IMG_SRC: &str = "'self' data:";

fn content_security_policy(img_src: &str) -> String {
    format!(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; \
         img-src {}; font-src 'self'; connect-src 'self'; frame-ancestors 'none'",
        img_src
    )
}

/// `scheme://host[:port]` of an absolute http(s) URL
fn origin_of(url: &str) -> Option<&str> {
    let scheme_end = url.find("://")?;
    let scheme = &url[..scheme_end];
    if scheme != "http" && scheme != "https" {
        return None;
    }

    let rest = &url[scheme_end + 3..];
    let host_end = rest.find('/').unwrap_or(rest.len());
    if host_end == 0 {
        return None;
    }

    Some(&url[..scheme_end + 3 + host_end])
}

impl SecurityHeaders {
    /// Builds header values for a deployment
    pub fn new(production: bool, blob_public_url: Option<&str>) -> Self {
        let img_src = match blob_public_url.and_then(origin_of) {
            Some(origin) => format!("{} {}", BASE_IMG_SRC, origin),
            None => BASE_IMG_SRC.to_string(),
        };

        let content_security_policy = HeaderValue::from_str(&content_security_policy(&img_src))
            .unwrap_or_else(|_| {
                HeaderValue::from_static(
                    "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; \
                     img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'",
                )
            });

        Self {
            content_security_policy,
            hsts: production,
        }
    }

    /// Header values for the configured deployment
    pub fn from_config(config: &Config) -> Self {
        let blob_url = config
            .blob
            .public_url
            .as_deref()
            .or(config.blob.endpoint.as_deref());
        Self::new(config.api.production, blob_url)
    }
}

/// Middleware adding security headers to every response
pub async fn security_headers(
    State(policy): State<Arc<SecurityHeaders>>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=(), payment=(), usb=()"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        policy.content_security_policy.clone(),
    );

    if policy.hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains; preload"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::Service as _;

    fn app(policy: SecurityHeaders) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(policy),
                security_headers,
            ))
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://cdn.example.com/easel/uploads"),
            Some("https://cdn.example.com")
        );
        assert_eq!(
            origin_of("http://localhost:9000"),
            Some("http://localhost:9000")
        );
        assert_eq!(origin_of("memory://blobs"), None);
        assert_eq!(origin_of("not a url"), None);
    }

    #[tokio::test]
    async fn test_headers_without_hsts() {
        let mut app = app(SecurityHeaders::new(false, None));
        let response = app
            .call(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert!(headers.get("strict-transport-security").is_none());
        assert!(headers
            .get("content-security-policy")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("img-src 'self' data:;"));
    }

    #[tokio::test]
    async fn test_production_headers_include_hsts_and_blob_origin() {
        let mut app = app(SecurityHeaders::new(
            true,
            Some("https://cdn.example.com/easel"),
        ));
        let response = app
            .call(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert!(headers.get("strict-transport-security").is_some());
        assert!(headers
            .get("content-security-policy")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("img-src 'self' data: https://cdn.example.com;"));
    }
}
