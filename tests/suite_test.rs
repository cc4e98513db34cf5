use std::fs;
use std::time::Duration;

use mercado_contract::http::{Client, Status};
use mercado_contract::report::{JsonFileSink, Outcome, Reporter};
use mercado_contract::suite::{Suite, SuiteContext, SuiteState};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mercado"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(20)))
        .mount(&mock_server)
        .await;

    // teardown 必须恰好执行一次
    Mock::given(method("DELETE"))
        .and(path("/mercado/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    mock_server
}

fn suite() -> Suite {
    Suite::new("lifecycle")
        .before_all(|ctx| {
            Box::pin(async move {
                ctx.get("/mercado")
                    .expect_status(Status::OK)
                    .stores("itemId", "body[0].id")
                    .send(ctx)
                    .await?;
                Ok(())
            })
        })
        .after_all(|ctx| {
            Box::pin(async move {
                let id = ctx.fixtures().get_str("itemId")?;
                ctx.delete("/mercado/{id}")
                    .with_path_param("id", id)
                    .expect_status(Status::NO_CONTENT)
                    .send(ctx)
                    .await?;
                Ok(())
            })
        })
        .describe("GET", |g| {
            g.it("wrong status fails", |ctx| {
                Box::pin(async move {
                    ctx.get("/mercado").expect_status(Status::CREATED).send(ctx).await?;
                    Ok(())
                })
            })
            .it("list passes", |ctx| {
                Box::pin(async move {
                    ctx.get("/mercado").expect("body[0].id == 3").send(ctx).await?;
                    Ok(())
                })
            })
            .it("slow call", |ctx| {
                Box::pin(async move {
                    ctx.get("/slow").expect_status(Status::OK).send(ctx).await?;
                    Ok(())
                })
            })
            .it("never reached", |ctx| {
                Box::pin(async move {
                    ctx.get("/mercado").send(ctx).await?;
                    Ok(())
                })
            })
        })
}

/// 中止后剩余 case 记为跳过，teardown 照常执行，JSON 报告照常输出
#[tokio::test]
async fn test_abort_still_runs_teardown_and_writes_report() {
    let mock_server = server().await;
    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("reports").join("run.json");

    let mut ctx = SuiteContext::new(Client::new().unwrap(), mock_server.uri());
    let mut reporter = Reporter::new("lifecycle").with_sink(JsonFileSink::new(&report_path));

    let report = suite()
        .run_until(
            &mut ctx,
            &mut reporter,
            tokio::time::sleep(Duration::from_millis(500)),
        )
        .await;
    let summary = reporter.finalize();

    assert!(report.aborted);
    assert!(!report.is_success());
    assert_eq!((report.passed, report.failed, report.skipped), (1, 2, 1));
    assert_eq!(report.teardown_warning, None);
    assert_eq!(report.states.last(), Some(&SuiteState::Done));
    assert_eq!(summary.total, 4);

    let records = reporter.records();
    assert_eq!(records[0].name, "GET > wrong status fails");
    assert_eq!(records[0].outcome, Outcome::Failed);
    assert!(records[0].detail.as_deref().unwrap().contains("Expected status 201, but got 200"));
    assert_eq!(records[2].detail.as_deref(), Some("aborted while running"));
    assert_eq!(records[3].outcome, Outcome::Skipped);

    let written: Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["suite"], "lifecycle");
    assert_eq!(written["summary"]["failed"], 2);
    assert_eq!(written["records"][3]["outcome"], "skipped");
    assert_eq!(written["run_id"], reporter.run_id().to_string());

    // 结束时校验 DELETE 恰好收到一次
    drop(mock_server);
}

/// 单个请求超时只让当前 case 失败
#[tokio::test]
async fn test_request_timeout_fails_only_that_case() {
    let mock_server = server().await;
    let client = Client::with_timeout(Duration::from_millis(200)).unwrap();
    let mut ctx = SuiteContext::new(client, mock_server.uri());
    let mut reporter = Reporter::new("lifecycle");

    let report = suite().run(&mut ctx, &mut reporter).await;

    assert!(!report.aborted);
    assert_eq!((report.passed, report.failed, report.skipped), (2, 2, 0));
    let slow = &reporter.records()[2];
    assert_eq!(slow.outcome, Outcome::Failed);
    assert!(slow.detail.as_deref().unwrap().contains("200ms"));
}
