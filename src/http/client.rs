use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::http::request::Request;
use crate::http::response::Response;
use crate::{HarnessError, Result};

/// 默认请求超时 (30s)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Clone, Debug)]
pub struct Client {
    inner: reqwest::Client,
    timeout: Duration,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder().build()?;
        Ok(Self { inner, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 发送请求
    ///
    /// 非 2xx 状态码不算错误，只有连接失败或超时才返回 Err
    pub async fn send(&self, request: &Request) -> Result<Response> {
        let timeout = request.timeout.unwrap_or(self.timeout);
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(timeout);

        if let Some(body) = &request.body {
            req = req.body(serde_json::to_vec(body)?);
        }

        debug!(method = %request.method, url = %request.url, "sending request");

        let start = Instant::now();
        let response = req
            .send()
            .await
            .map_err(|e| transport_error(request, timeout, e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(request, timeout, e))?;
        let duration = start.elapsed();

        info!(
            method = %request.method,
            url = %request.url,
            status,
            elapsed_ms = duration.as_millis() as u64,
            "request completed"
        );

        Response::new(status, headers, body.to_vec(), duration)
    }
}

fn transport_error(request: &Request, timeout: Duration, err: reqwest::Error) -> HarnessError {
    if err.is_timeout() {
        HarnessError::Timeout {
            method: request.method.to_string(),
            url: request.url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        HarnessError::Network {
            method: request.method.to_string(),
            url: request.url.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let client = Client::new().unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_custom_timeout() {
        let client = Client::with_timeout(Duration::from_millis(250)).unwrap();
        assert_eq!(client.timeout().as_millis(), 250);
    }
}
