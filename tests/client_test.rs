use std::time::Duration;

use mercado_contract::HarnessError;
use mercado_contract::http::{Body, Client, Method, RequestBuilder};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 非 2xx 状态码作为普通响应返回
#[tokio::test]
async fn test_non_success_status_is_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mercado/0"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&mock_server)
        .await;

    let request = RequestBuilder::new(Method::Get, format!("{}/mercado/{{id}}", mock_server.uri()))
        .with_path_param("id", 0)
        .build()
        .unwrap();

    let response = Client::new().unwrap().send(&request).await.unwrap();
    assert_eq!(response.status.code(), 404);
    assert!(response.is_client_error());
    assert_eq!(response.returns("body.message").unwrap(), json!("not found"));
}

/// 非标准状态码（6xx-9xx）同样作为响应数据返回
#[tokio::test]
async fn test_unusual_status_code_is_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/odd"))
        .respond_with(ResponseTemplate::new(799))
        .mount(&mock_server)
        .await;

    let request = RequestBuilder::new(Method::Get, format!("{}/odd", mock_server.uri()))
        .build()
        .unwrap();

    let response = Client::new().unwrap().send(&request).await.unwrap();
    assert_eq!(response.status.code(), 799);
    assert!(!response.is_success());
}

/// JSON body、header 与查询参数都会发送出去
#[tokio::test]
async fn test_json_body_headers_and_query_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mercado"))
        .and(query_param("dry", "true"))
        .and(header("content-type", "application/json"))
        .and(header("x-suite", "mercado"))
        .and(body_json(json!({"nome": "X", "cnpj": "12345678912345", "endereco": "Y"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = RequestBuilder::new(Method::Post, format!("{}/mercado", mock_server.uri()))
        .with_query("dry", true)
        .with_header("X-Suite", "mercado")
        .with_json(&json!({"nome": "X", "cnpj": "12345678912345", "endereco": "Y"}))
        .unwrap()
        .build()
        .unwrap();

    let response = Client::new().unwrap().send(&request).await.unwrap();
    assert_eq!(response.status.code(), 201);
    assert!(matches!(response.body, Body::Empty));
}

#[tokio::test]
async fn test_timeout_is_reported_with_duration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
        .mount(&mock_server)
        .await;

    let client = Client::with_timeout(Duration::from_millis(100)).unwrap();
    let request = RequestBuilder::new(Method::Get, format!("{}/slow", mock_server.uri()))
        .build()
        .unwrap();

    match client.send(&request).await {
        Err(HarnessError::Timeout { timeout_ms, method, .. }) => {
            assert_eq!(timeout_ms, 100);
            assert_eq!(method, "GET");
        }
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

/// 请求自身的超时优先于 Client 的默认值
#[tokio::test]
async fn test_request_timeout_overrides_client_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
        .mount(&mock_server)
        .await;

    let request = RequestBuilder::new(Method::Get, mock_server.uri())
        .with_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let result = Client::new().unwrap().send(&request).await;
    assert!(matches!(result, Err(HarnessError::Timeout { timeout_ms: 50, .. })));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // 绑定后立即释放，得到一个没有监听者的端口
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let request = RequestBuilder::new(Method::Get, format!("http://127.0.0.1:{}/mercado", port))
        .build()
        .unwrap();

    let result = Client::new().unwrap().send(&request).await;
    assert!(matches!(result, Err(HarnessError::Network { .. })), "{:?}", result);
}
