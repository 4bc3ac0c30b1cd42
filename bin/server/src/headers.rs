//! Security headers added to every response.

use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Content Security Policy allowing only this origin and the design-system CDN.
///
/// Inline scripts and styles stay allowed; the design system's page
/// templates rely on them.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self' https://cdn.ons.gov.uk 'unsafe-inline'; \
     font-src 'self' https://cdn.ons.gov.uk data:; \
     img-src 'self' https://cdn.ons.gov.uk data:";

const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains";

fn header_layer(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

/// Adds the security headers to every route of `router`.
///
/// HSTS is omitted in dev mode.
pub fn with_security_headers<S>(router: Router<S>, dev_mode: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let router = router
        .layer(header_layer(
            header::CONTENT_SECURITY_POLICY,
            CONTENT_SECURITY_POLICY,
        ))
        .layer(header_layer(header::X_FRAME_OPTIONS, "DENY"))
        .layer(header_layer(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(header_layer(header::REFERRER_POLICY, "strict-origin"));

    if dev_mode {
        router
    } else {
        router.layer(header_layer(
            header::STRICT_TRANSPORT_SECURITY,
            STRICT_TRANSPORT_SECURITY,
        ))
    }
}
