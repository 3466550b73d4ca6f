/// Hardening headers for every response
///
/// The API serves JSON to the two portal SPAs, so only the headers that
/// matter for a JSON backend are set:
///
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Strict-Transport-Security` when the deployment is HTTPS (follows
///   the same switch as Secure cookies)

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

type HeaderFuture = std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>;

/// Creates a middleware closure that stamps the hardening headers onto
/// each outgoing response
///
/// `enable_hsts` should be true only when the server is reached over
/// HTTPS; emitting HSTS on a plain-HTTP dev setup locks browsers out.
pub fn security_headers(enable_hsts: bool) -> impl Fn(Request, Next) -> HeaderFuture + Clone {
    move |req, next| {
        Box::pin(async move {
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

            if enable_hsts {
                headers.insert(
                    header::STRICT_TRANSPORT_SECURITY,
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                );
            }

            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn, routing::get, Router};
    use tower::Service as _;

    fn app(enable_hsts: bool) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(from_fn(security_headers(enable_hsts)))
    }

    #[tokio::test]
    async fn stamps_headers_without_hsts() {
        let mut app = app(false);

        let response = app
            .call(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            headers.get("referrer-policy").unwrap(),
            "strict-origin-when-cross-origin"
        );
        assert!(headers.get("strict-transport-security").is_none());
    }

    #[tokio::test]
    async fn emits_hsts_when_enabled() {
        let mut app = app(true);

        let response = app
            .call(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("strict-transport-security")
                .unwrap(),
            "max-age=31536000; includeSubDomains"
        );
    }
}
