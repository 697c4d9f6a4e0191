use crate::{
    api::employee,
    auth::handlers,
    config::Config,
    error::ApiError,
};
use actix_cors::Cors;
use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{
    HttpResponse, Responder, guard,
    http::{header, Method},
    middleware::DefaultHeaders,
    web,
};
use anyhow::{Result, anyhow};
use serde_json::json;

const MAX_JSON_BYTES: usize = 64 * 1024;

/// Per client IP limiter: `requests` per `window_secs`, allowing a full burst.
pub fn build_limiter(
    requests: u32,
    window_secs: u64,
) -> Result<GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>> {
    let window_ms = window_secs
        .checked_mul(1000)
        .ok_or_else(|| anyhow!("rate limit window of {window_secs}s is too large"))?;
    let per_ms = (window_ms / requests.max(1) as u64).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests} per {window_secs}s"))
}

pub fn limiter_from(config: &Config) -> Result<GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>> {
    build_limiter(config.rate_limit_requests, config.rate_limit_window_secs)
}

pub fn cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url)
        .allowed_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Baseline hardening headers added to every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "DENY"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add((header::X_XSS_PROTECTION, "0"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
        .add((
            header::STRICT_TRANSPORT_SECURITY,
            "max-age=15552000; includeSubDomains",
        ))
}

fn is_json(ctx: &guard::GuardContext<'_>) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with("application/json"))
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(json!({
        "message": "Route not found"
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .limit(MAX_JSON_BYTES)
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into());

    cfg.app_data(json_config).service(
        web::scope("/api/employees")
            // /api/employees
            .service(
                web::resource("")
                    .route(
                        web::post()
                            .guard(guard::fn_guard(is_json))
                            .to(employee::create_employee_json),
                    )
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // /api/employees/login
            .service(web::resource("/login").route(web::post().to(handlers::login)))
            // /api/employees/{emp_id}/image
            .service(
                web::resource("/{emp_id}/image")
                    .route(web::get().to(employee::get_profile_image)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_accepts_configured_window() {
        assert!(build_limiter(100, 15 * 60).is_ok());
        assert!(build_limiter(1, 1).is_ok());
    }

    #[test]
    fn oversized_window_is_rejected() {
        assert!(build_limiter(10, u64::MAX).is_err());
        assert!(build_limiter(10, u64::MAX / 1000 + 1).is_err());
    }
}
