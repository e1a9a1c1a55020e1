//! HTTP middleware (CORS, 404 handler)

use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use axum::response::IntoResponse;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::types::ApiError;
use crate::core::config::is_all_interfaces;

/// Browser origins allowed to call the query API
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Origins for a server bound to `host:port`
    ///
    /// The viewer frontend is served either by this server or by a dev server
    /// on the next port up.
    pub fn new(host: &str, port: u16) -> Self {
        let mut origins = Vec::new();
        let ports = [Some(port), port.checked_add(1), None];
        let is_all = is_all_interfaces(host);

        let base_hosts: Vec<String> = if is_all || host == "127.0.0.1" || host == "localhost" {
            vec!["localhost".to_string(), "127.0.0.1".to_string()]
        } else {
            vec![host.to_string()]
        };

        let mut hosts = base_hosts;
        if is_all && let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            hosts.extend(
                interfaces
                    .iter()
                    .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
                    .map(|(_, ip)| ip.to_string()),
            );
        }

        for h in &hosts {
            for p in ports {
                let origin = match p {
                    Some(p) => format!("http://{}:{}", h, p),
                    None => format!("http://{}", h),
                };
                if !origins.contains(&origin) {
                    origins.push(origin);
                }
            }
        }

        Self { origins }
    }

    /// Check if an origin is allowed
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer. The API is read-only, so only GET is allowed.
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
}

/// Handle 404 Not Found with logging
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404] No route");
    ApiError::not_found("NOT_FOUND", format!("No route for {}", req.uri().path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_origins() {
        let origins = AllowedOrigins::new("127.0.0.1", 5390);
        assert!(origins.is_allowed("http://localhost:5390"));
        assert!(origins.is_allowed("http://127.0.0.1:5391"));
        assert!(origins.is_allowed("http://localhost"));
        assert!(!origins.is_allowed("http://evil.example:5390"));
    }

    #[test]
    fn test_custom_host_origins() {
        let origins = AllowedOrigins::new("viewer.internal", 8080);
        assert!(origins.is_allowed("http://viewer.internal:8080"));
        assert!(!origins.is_allowed("http://localhost:8080"));
    }

    #[test]
    fn test_max_port_does_not_overflow() {
        let origins = AllowedOrigins::new("localhost", u16::MAX);
        assert!(origins.is_allowed("http://localhost:65535"));
    }
}
