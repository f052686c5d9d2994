// src/utils.rs
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use std::fmt;
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug)]
pub enum RequestError {
    MissingPeerIP,
    RateLimitExceeded,
    InvalidPlatform(String),
    MissingAddress,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPeerIP => write!(f, "Failed to extract client IP"),
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::InvalidPlatform(p) => write!(f, "Invalid platform: {}", p),
            Self::MissingAddress => write!(f, "Missing server address"),
        }
    }
}

impl ResponseError for RequestError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::RateLimitExceeded => HttpResponse::TooManyRequests().body(self.to_string()),
            _ => HttpResponse::BadRequest().body(self.to_string()),
        }
    }
}

/// Client IP for rate limiting: first hop of X-Forwarded-For when present
/// (the service is expected to sit behind a reverse proxy), otherwise the
/// socket peer address.
pub fn extract_peer_ip(req: &HttpRequest) -> Result<IpAddr, RequestError> {
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(ip_str) = forwarded_for.to_str() {
            if let Some(first_ip) = ip_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Ok(ip);
                }
            }
        }
    }

    match req.peer_addr() {
        Some(addr) => Ok(addr.ip()),
        None => Err(RequestError::MissingPeerIP),
    }
}

pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_unix_is_monotonic_enough() {
        let a = now_unix();
        let b = now_unix();
        assert!(b >= a);
        assert!(a > 1_600_000_000);
    }
}
