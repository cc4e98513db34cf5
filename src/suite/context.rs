use crate::config::Settings;
use crate::fixture::Fixtures;
use crate::http::{Client, Method};
use crate::spec::Spec;
use crate::Result;

/// 一次 suite 运行的共享状态：HTTP 客户端、base URL、默认 header 与 fixtures
#[derive(Debug)]
pub struct SuiteContext {
    client: Client,
    base_url: String,
    headers: Vec<(String, String)>,
    fixtures: Fixtures,
}

impl SuiteContext {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
            fixtures: Fixtures::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::with_timeout(settings.timeout)?;
        let mut ctx = Self::new(client, settings.base_url.clone());
        let mut headers: Vec<_> = settings.headers.iter().collect();
        headers.sort();
        for (key, value) in headers {
            ctx = ctx.with_header(key, value);
        }
        Ok(ctx)
    }

    /// 每个请求都会带上的 header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    pub fn fixtures_mut(&mut self) -> &mut Fixtures {
        &mut self.fixtures
    }

    pub(crate) fn parts_mut(&mut self) -> (&Client, &mut Fixtures) {
        (&self.client, &mut self.fixtures)
    }

    /// 相对路径拼接 base URL，绝对 URL 原样返回
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn spec(&self, method: Method, path: &str) -> Spec {
        self.headers
            .iter()
            .fold(Spec::new(method, self.url(path)), |spec, (key, value)| {
                spec.with_header(key, value)
            })
    }

    pub fn get(&self, path: &str) -> Spec {
        self.spec(Method::Get, path)
    }

    pub fn post(&self, path: &str) -> Spec {
        self.spec(Method::Post, path)
    }

    pub fn put(&self, path: &str) -> Spec {
        self.spec(Method::Put, path)
    }

    pub fn delete(&self, path: &str) -> Spec {
        self.spec(Method::Delete, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn ctx() -> SuiteContext {
        SuiteContext::new(Client::new().unwrap(), "https://api.example.com/")
    }

    #[test]
    fn test_url_joining() {
        let ctx = ctx();
        assert_eq!(ctx.base_url(), "https://api.example.com");
        assert_eq!(ctx.url("/mercado"), "https://api.example.com/mercado");
        assert_eq!(ctx.url("mercado/0"), "https://api.example.com/mercado/0");
        assert_eq!(ctx.url("http://other/x"), "http://other/x");
    }

    #[test]
    fn test_from_settings() {
        let mut headers = HashMap::new();
        headers.insert("x-suite".to_string(), "mercado".to_string());
        let settings = Settings {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_millis(500),
            report_path: None,
            headers,
        };

        let ctx = SuiteContext::from_settings(&settings).unwrap();
        assert_eq!(ctx.client().timeout(), Duration::from_millis(500));
        assert_eq!(ctx.base_url(), "http://localhost:3000");
        assert_eq!(ctx.headers, vec![("x-suite".to_string(), "mercado".to_string())]);
    }

    #[test]
    fn test_fixtures_visible_through_context() {
        let mut ctx = ctx();
        ctx.fixtures_mut().set("itemId", 5).unwrap();
        assert_eq!(ctx.fixtures().get_str("itemId").unwrap(), "5");
    }
}
