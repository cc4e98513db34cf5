use mercado_contract::assertion::AssertError;
use mercado_contract::http::Client;
use mercado_contract::suite::SuiteContext;
use mercado_contract::{HarnessError, Spec};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mercado_list_server() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mercado"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "req-42")
                .set_body_json(json!([
                    {"id": 11, "nome": "Mercado A", "cnpj": "12345678912345", "endereco": "Rua A"},
                    {"id": 12, "nome": "Mercado B", "cnpj": "12345678912345", "endereco": "Rua B"}
                ])),
        )
        .mount(&mock_server)
        .await;

    mock_server
}

fn context(server: &MockServer) -> SuiteContext {
    SuiteContext::new(Client::new().unwrap(), server.uri())
}

/// 所有期望通过后保存 fixture
#[tokio::test]
async fn test_expectations_pass_and_captures_are_stored() {
    let server = mercado_list_server().await;
    let mut ctx = context(&server);

    ctx.get("/mercado")
        .expect_status(200)
        .expect_header("X-Request-Id", "req-42")
        .expect_json_like(json!([
            {"id": 11, "nome": "Mercado A", "cnpj": "12345678912345", "endereco": "Rua A"},
            {"id": 12, "nome": "Mercado B", "cnpj": "12345678912345", "endereco": "Rua B"}
        ]))
        .expect("body[1].nome == \"Mercado B\"")
        .expect("headers.content-type contains \"json\"")
        .expect("response.time < 10000")
        .stores("itemId", "body[0].id")
        .stores("requestId", "headers.x-request-id")
        .send(&mut ctx)
        .await
        .unwrap();

    assert_eq!(ctx.fixtures().get_str("itemId").unwrap(), "11");
    assert_eq!(ctx.fixtures().get_str("requestId").unwrap(), "req-42");
}

/// 同一次调用上的失败全部报告，而不是只报告第一个
#[tokio::test]
async fn test_every_failed_expectation_is_reported() {
    let server = mercado_list_server().await;
    let mut ctx = context(&server);

    let result = ctx
        .get("/mercado")
        .expect_status(201)
        .expect("body[0].id == 99")
        .expect_header("x-request-id", "other")
        .stores("itemId", "body[0].id")
        .send(&mut ctx)
        .await;

    match result {
        Err(HarnessError::Assertion(failure)) => {
            assert_eq!(failure.errors.len(), 3);
            assert_eq!(
                failure.errors[0],
                AssertError::StatusMismatch {
                    expected: 201,
                    actual: 200
                }
            );
            assert!(failure.request.starts_with("GET "));
        }
        other => panic!("Expected Assertion error, got {:?}", other),
    }

    // 期望失败时不保存任何 fixture
    assert!(ctx.fixtures().is_empty());
}

/// 子集匹配忽略对象多出的字段，数组仍然逐个元素完全相等
#[tokio::test]
async fn test_subset_match_ignores_extra_keys_but_not_array_shape() {
    let server = mercado_list_server().await;

    Mock::given(method("GET"))
        .and(path("/mercado/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 11,
            "nome": "Mercado A",
            "cnpj": "12345678912345",
            "endereco": "Rua A",
            "produtos": {"hortifruit": [], "padaria": []}
        })))
        .mount(&server)
        .await;

    let mut ctx = context(&server);

    let response = ctx
        .get("/mercado/11")
        .expect_json_like(json!({"nome": "Mercado A", "produtos": {"padaria": []}}))
        .send(&mut ctx)
        .await;
    assert!(response.is_ok(), "{:?}", response.err());

    let result = ctx
        .get("/mercado")
        .expect_json_like(json!([{"id": 11}, {"id": 12}]))
        .send(&mut ctx)
        .await;
    assert!(matches!(result, Err(HarnessError::Assertion(_))));
}

#[tokio::test]
async fn test_exact_json_mismatch_lists_paths() {
    let server = mercado_list_server().await;
    let mut ctx = context(&server);

    let result = ctx
        .get("/mercado")
        .expect_json(json!([
            {"id": 11, "nome": "Mercado A", "cnpj": "12345678912345", "endereco": "Rua A"},
            {"id": 12, "nome": "Mercado C", "cnpj": "12345678912345", "endereco": "Rua B"}
        ]))
        .send(&mut ctx)
        .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("$[1].nome"), "{}", message);
}

#[tokio::test]
async fn test_returns_extracts_a_value() {
    let server = mercado_list_server().await;
    let mut ctx = context(&server);

    let id = ctx
        .get("/mercado")
        .expect_status(200)
        .returns(&mut ctx, "res.body[1].id")
        .await
        .unwrap();
    assert_eq!(id, json!(12));

    let missing = ctx
        .get("/mercado")
        .returns(&mut ctx, "body[5].id")
        .await;
    assert!(matches!(missing, Err(HarnessError::Extraction { .. })));
}

/// 同一个 fixture 不能被写两次
#[tokio::test]
async fn test_capture_is_write_once() {
    let server = mercado_list_server().await;
    let mut ctx = context(&server);

    ctx.get("/mercado")
        .stores("itemId", "body[0].id")
        .send(&mut ctx)
        .await
        .unwrap();

    let second = ctx
        .get("/mercado")
        .stores("itemId", "body[1].id")
        .send(&mut ctx)
        .await;
    assert!(matches!(second, Err(HarnessError::FixtureAlreadySet(ref key)) if key == "itemId"));
    assert_eq!(ctx.fixtures().get_str("itemId").unwrap(), "11");
}

/// 任何一个捕获失败时，同一次调用的其它捕获也不写入
#[tokio::test]
async fn test_failed_capture_writes_no_fixtures() {
    let server = mercado_list_server().await;
    let mut ctx = context(&server);

    let result = ctx
        .get("/mercado")
        .stores("itemId", "body[0].id")
        .stores("lastId", "body[9].id")
        .send(&mut ctx)
        .await;
    assert!(matches!(result, Err(HarnessError::Extraction { .. })));
    assert!(ctx.fixtures().is_empty());

    // 重试不会因为上一次的部分写入得到 FixtureAlreadySet
    ctx.get("/mercado")
        .stores("itemId", "body[0].id")
        .stores("lastId", "body[1].id")
        .send(&mut ctx)
        .await
        .unwrap();
    assert_eq!(ctx.fixtures().get_str("itemId").unwrap(), "11");
    assert_eq!(ctx.fixtures().get_str("lastId").unwrap(), "12");

    // 已有的 key 冲突时，新的 key 也不写入
    let conflict = ctx
        .get("/mercado")
        .stores("requestId", "headers.x-request-id")
        .stores("itemId", "body[1].id")
        .send(&mut ctx)
        .await;
    assert!(matches!(conflict, Err(HarnessError::FixtureAlreadySet(ref key)) if key == "itemId"));
    assert!(!ctx.fixtures().contains("requestId"));
    assert_eq!(ctx.fixtures().len(), 2);
}

/// SuiteContext 的默认 header 会带到每个请求上
#[tokio::test]
async fn test_default_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/mercado/7"))
        .and(header("authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut ctx = context(&mock_server).with_header("Authorization", "Bearer t");
    ctx.delete("/mercado/{id}")
        .with_path_param("id", 7)
        .expect_status(204)
        .send(&mut ctx)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_standalone_spec_against_absolute_url() {
    let server = mercado_list_server().await;
    let mut ctx = context(&server);

    Spec::get(format!("{}/mercado", server.uri()))
        .expect("body[0].id exists")
        .send(&mut ctx)
        .await
        .unwrap();
}
