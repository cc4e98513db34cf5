use crate::HarnessError;
use crate::http::Status;
use crate::mercado::model::{INVALID_CNPJ, Mercado, SUB_RESOURCES, invalid_cnpj_errors};
use crate::suite::Suite;

/// setup 中保存的已存在 mercado 的 id
pub const ITEM_ID: &str = "itemId";

/// 不存在的 mercado id
pub const MISSING_ID: u64 = 0;

/// mercado CRUD 契约测试
///
/// setup 取第一个已存在的 mercado 作为 `itemId`，teardown 删除它。
/// 最后一个 case 已经删除了 `itemId`，所以 teardown 的 DELETE 通常得到 404，
/// 这只作为警告记录。
pub fn mercado_suite() -> Suite {
    let suite = Suite::new("Mercado")
        .before_all(|ctx| {
            Box::pin(async move {
                ctx.get("/mercado")
                    .expect_status(Status::OK)
                    .expect("body[0].id exists")
                    .stores(ITEM_ID, "body[0].id")
                    .send(ctx)
                    .await?;
                Ok(())
            })
        })
        .after_all(|ctx| {
            Box::pin(async move {
                let id = ctx.fixtures().get_str(ITEM_ID)?;
                ctx.delete("/mercado/{id}")
                    .with_path_param("id", id)
                    .expect_status(Status::NO_CONTENT)
                    .send(ctx)
                    .await?;
                Ok(())
            })
        })
        .describe("GET", |g| {
            g.it("returns every registered mercado", |ctx| {
                Box::pin(async move {
                    let body = ctx
                        .get("/mercado")
                        .expect_status(Status::OK)
                        .returns(ctx, "body")
                        .await?;
                    if !body.is_array() {
                        return Err(HarnessError::Other(format!("expected a JSON array, got {}", body)));
                    }
                    Ok(())
                })
            })
            .it("returns a mercado by id", |ctx| {
                Box::pin(async move {
                    let id = ctx.fixtures().get_str(ITEM_ID)?;
                    ctx.get("/mercado/{id}")
                        .with_path_param("id", id)
                        .expect_status(Status::OK)
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
            .it("does not return a missing mercado", |ctx| {
                Box::pin(async move {
                    ctx.get("/mercado/{id}")
                        .with_path_param("id", MISSING_ID)
                        .expect_status(Status::NOT_FOUND)
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
        })
        .describe("POST", |g| {
            g.it("creates a mercado", |ctx| {
                Box::pin(async move {
                    ctx.post("/mercado")
                        .with_json(&Mercado::unique("Contrato"))
                        .expect_status(Status::CREATED)
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
            .it("rejects an invalid cnpj", |ctx| {
                Box::pin(async move {
                    ctx.post("/mercado")
                        .with_json(&Mercado::new("Mercado Teste", INVALID_CNPJ, "testes"))
                        .expect_status(Status::BAD_REQUEST)
                        .expect_json(invalid_cnpj_errors(INVALID_CNPJ))
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
        })
        .describe("PUT", |g| {
            g.it("updates an existing mercado", |ctx| {
                Box::pin(async move {
                    let id = ctx.fixtures().get_str(ITEM_ID)?;
                    ctx.put("/mercado/{id}")
                        .with_path_param("id", id)
                        .with_json(&Mercado::unique("Contrato Atualizado"))
                        .expect_status(Status::OK)
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
            .it("rejects an invalid cnpj", |ctx| {
                Box::pin(async move {
                    let id = ctx.fixtures().get_str(ITEM_ID)?;
                    ctx.put("/mercado/{id}")
                        .with_path_param("id", id)
                        .with_json(&Mercado::unique("Teste").with_cnpj(INVALID_CNPJ))
                        .expect_status(Status::BAD_REQUEST)
                        .expect("body.errors exists")
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
            .it("does not update a missing mercado", |ctx| {
                Box::pin(async move {
                    ctx.put("/mercado/{id}")
                        .with_path_param("id", MISSING_ID)
                        .with_json(&Mercado::unique("Teste"))
                        .expect_status(Status::NOT_FOUND)
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
        })
        .describe("DELETE", |g| {
            g.it("does not remove a missing mercado", |ctx| {
                Box::pin(async move {
                    ctx.delete("/mercado/{id}")
                        .with_path_param("id", MISSING_ID)
                        .expect_status(Status::NOT_FOUND)
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
        })
        .describe("GET", |g| {
            g.it("does not list produtos of a missing mercado", |ctx| {
                Box::pin(async move {
                    ctx.get("/mercado/{id}/produtos")
                        .with_path_param("id", MISSING_ID)
                        .expect_status(Status::NOT_FOUND)
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
        });

    let suite = SUB_RESOURCES.iter().fold(suite, |suite, &(name, path)| {
        suite.describe("GET", move |g| {
            g.it(format!("does not return {} of a missing mercado", name), move |ctx| {
                Box::pin(async move {
                    ctx.get(&format!("/mercado/{{id}}/produtos/{}", path))
                        .with_path_param("id", MISSING_ID)
                        .expect_status(Status::NOT_FOUND)
                        .send(ctx)
                        .await?;
                    Ok(())
                })
            })
        })
    });

    suite.describe("DELETE", |g| {
        g.it("removes a mercado and it is gone afterwards", |ctx| {
            Box::pin(async move {
                let id = ctx.fixtures().get_str(ITEM_ID)?;
                ctx.delete("/mercado/{id}")
                    .with_path_param("id", &id)
                    .expect_status(Status::NO_CONTENT)
                    .send(ctx)
                    .await?;
                ctx.get("/mercado/{id}")
                    .with_path_param("id", &id)
                    .expect_status(Status::NOT_FOUND)
                    .send(ctx)
                    .await?;
                Ok(())
            })
        })
    })
}
