use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::assertion::{Expectation, check, parse_assertion};
use crate::error::AssertionFailure;
use crate::fixture::{Capture, Fixtures};
use crate::http::{Client, Method, RequestBuilder, Response};
use crate::suite::SuiteContext;
use crate::{HarnessError, Result};

/// 一次请求及其期望，链式构建
///
/// 构建过程中的错误（例如无法序列化的 body、写错的断言）推迟到 `send` 时返回
///
/// ```no_run
/// # use mercado_contract::{Spec, suite::SuiteContext};
/// # async fn demo(ctx: &mut SuiteContext) -> mercado_contract::Result<()> {
/// Spec::get("https://api.example.com/mercado")
///     .expect_status(200)
///     .expect("body[0].id exists")
///     .stores("itemId", "body[0].id")
///     .send(ctx)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Spec {
    request: RequestBuilder,
    expectations: Vec<Expectation>,
    captures: Vec<(String, String)>,
    error: Option<HarnessError>,
}

impl Spec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            request: RequestBuilder::new(method, url),
            expectations: Vec::new(),
            captures: Vec::new(),
            error: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn with_path_param(mut self, name: &str, value: impl ToString) -> Self {
        self.request = self.request.with_path_param(name, value);
        self
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.request = self.request.with_query(key, value);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.request = self.request.with_header(key, value);
        self
    }

    pub fn with_json<T: Serialize>(mut self, data: &T) -> Self {
        match self.request.clone().with_json(data) {
            Ok(request) => self.request = request,
            Err(e) => self.fail(e),
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request = self.request.with_timeout(timeout);
        self
    }

    pub fn expect_status(mut self, code: u16) -> Self {
        self.expectations.push(Expectation::Status(code));
        self
    }

    /// body 必须与给定 JSON 完全相等
    pub fn expect_json(mut self, value: Value) -> Self {
        self.expectations.push(Expectation::Json(value));
        self
    }

    /// body 必须包含给定 JSON
    pub fn expect_json_like(mut self, value: Value) -> Self {
        self.expectations.push(Expectation::JsonLike(value));
        self
    }

    pub fn expect_header(mut self, name: &str, value: &str) -> Self {
        self.expectations.push(Expectation::Header {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// 文本断言，例如 `body.errors[1].path == "cnpj"`
    pub fn expect(mut self, assertion: &str) -> Self {
        match parse_assertion(assertion) {
            Ok(expr) => self.expectations.push(Expectation::Expr(expr)),
            Err(e) => self.fail(HarnessError::ParseError(format!("{}: {}", assertion, e))),
        }
        self
    }

    /// 所有期望通过后，把 `path` 处的值保存为 fixture `name`
    pub fn stores(mut self, name: &str, path: &str) -> Self {
        self.captures.push((name.to_string(), path.to_string()));
        self
    }

    fn fail(&mut self, err: HarnessError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// 发送请求并检查所有期望
    pub async fn send(self, ctx: &mut SuiteContext) -> Result<Response> {
        let (client, fixtures) = ctx.parts_mut();
        self.send_with(client, fixtures).await
    }

    /// 发送请求，然后按路径返回一个值
    pub async fn returns(self, ctx: &mut SuiteContext, path: &str) -> Result<Value> {
        let response = self.send(ctx).await?;
        response.returns(path)
    }

    pub async fn send_with(self, client: &Client, fixtures: &mut Fixtures) -> Result<Response> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let captures = self
            .captures
            .iter()
            .map(|(name, path)| Capture::parse(name, path))
            .collect::<Result<Vec<_>>>()?;

        let request = self.request.build()?;
        let response = client.send(&request).await?;

        let errors: Vec<_> = self
            .expectations
            .iter()
            .filter_map(|expectation| check(&response, expectation).err())
            .collect();

        if !errors.is_empty() {
            let failure = AssertionFailure {
                request: request.describe(),
                errors,
            };
            warn!(request = %failure.request, "expectation failed: {}", failure);
            return Err(failure.into());
        }

        // 先提取全部捕获，全部成功后再写入
        let values = captures
            .iter()
            .map(|capture| -> Result<(String, Value)> {
                Ok((capture.name.clone(), capture.extract(&response)?))
            })
            .collect::<Result<Vec<_>>>()?;
        fixtures.set_all(values)?;

        debug!(
            request = %request.describe(),
            expectations = self.expectations.len(),
            "all expectations passed"
        );
        Ok(response)
    }
}
