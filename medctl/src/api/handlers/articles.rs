use crate::AppState;
use crate::api::extractors::JsonBody;
use crate::api::handlers::{not_found_as, parse_id};
use crate::api::models::articles::{ArticleCreate, ArticleResponse, ArticleUpdate, CategoryCount};
use crate::api::models::common::{ErrorResponse, MessageResponse};
use crate::db::handlers::{Articles, Repository};
use crate::db::models::articles::ArticleWriteDBRequest;
use crate::errors::{Error, Result};
use crate::notifications::Notification;
use crate::validation::validate_into;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[utoipa::path(
    post,
    path = "/resources",
    tag = "articles",
    summary = "Publish an article",
    description = "Notifies the admin address once the article is stored.",
    request_body = ArticleCreate,
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_article(State(state): State<AppState>, JsonBody(body): JsonBody) -> Result<(StatusCode, Json<ArticleResponse>)> {
    let request: ArticleCreate = validate_into(ArticleCreate::FIELDS, body)?;

    let mut repo = Articles::new(state.store.as_ref());
    let article = repo.create(&ArticleWriteDBRequest::from(request)).await?;

    state.notifier.notify(Notification::NewArticle {
        title: article.data.title.clone(),
        author: article.data.author.clone(),
        category: article.data.category.as_str().to_string(),
        publish_date: article.data.publish_date,
        content: article.data.content.clone(),
    });

    Ok((StatusCode::CREATED, Json(article.into())))
}

#[utoipa::path(
    get,
    path = "/resources",
    tag = "articles",
    summary = "List articles",
    responses(
        (status = 200, description = "All articles, oldest first", body = Vec<ArticleResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<ArticleResponse>>> {
    let articles = Articles::new(state.store.as_ref()).list(&()).await?;
    Ok(Json(articles.into_iter().map(ArticleResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/resources/{id}",
    tag = "articles",
    summary = "Get an article",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article found", body = ArticleResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Article not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_article(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<ArticleResponse>> {
    let id = parse_id("article", &id)?;

    match Articles::new(state.store.as_ref()).get_by_id(id).await? {
        Some(article) => Ok(Json(article.into())),
        None => Err(Error::NotFound {
            resource: "Article".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    put,
    path = "/resources/{id}",
    tag = "articles",
    summary = "Replace an article",
    description = "An omitted publish_date keeps the stored one.",
    params(("id" = String, Path, description = "Article ID")),
    request_body = ArticleUpdate,
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 400, description = "Malformed ID or fields, or nothing changed", body = ErrorResponse),
        (status = 404, description = "Article not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<ArticleResponse>> {
    let id = parse_id("article", &id)?;
    let request: ArticleUpdate = validate_into(ArticleUpdate::FIELDS, body)?;

    let article = Articles::new(state.store.as_ref())
        .update(id, &ArticleWriteDBRequest::from(request))
        .await
        .map_err(not_found_as("Article", id))?;

    Ok(Json(article.into()))
}

#[utoipa::path(
    delete,
    path = "/resources/{id}",
    tag = "articles",
    summary = "Delete an article",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Article not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_article(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MessageResponse>> {
    let id = parse_id("article", &id)?;

    if !Articles::new(state.store.as_ref()).delete(id).await? {
        return Err(Error::NotFound {
            resource: "Article".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(MessageResponse::new("Article deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/resources/category-counts",
    tag = "articles",
    summary = "Count articles per category",
    responses(
        (status = 200, description = "Counts per category, or a message when there are no articles", body = Vec<CategoryCount>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn category_counts(State(state): State<AppState>) -> Result<Response> {
    let counts = Articles::new(state.store.as_ref()).category_counts().await?;

    if counts.is_empty() {
        return Ok(Json(MessageResponse::new("No categories found")).into_response());
    }

    let counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    Ok(Json(counts).into_response())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[test_log::test(tokio::test)]
    async fn test_publish_notifies_admin() {
        let (server, mail) = create_test_app().await;

        let response = server.post("/resources").json(&article_json("Eat well", "nutrition")).await;
        response.assert_status(StatusCode::CREATED);
        let article: Value = response.json();
        assert_eq!(article["category"], "nutrition");
        assert!(article["publish_date"].is_string());

        let sent = mail.wait_for_sends(1).await;
        assert_eq!(sent[0].to, TEST_ADMIN_EMAIL);
        assert_eq!(sent[0].subject, "New Article Added");
        assert!(sent[0].body.contains("\"Eat well\""));
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_category_rejected() {
        let (server, mail) = create_test_app().await;

        let response = server.post("/resources").json(&article_json("Eat well", "fitness")).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["invalidFields"][0]["field"], "category");
        assert_eq!(mail.attempts(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_keeps_publish_date() {
        let (server, _mail) = create_test_app().await;
        let mut body = article_json("Eat well", "nutrition");
        body["publish_date"] = json!("2024-06-01");
        let created: Value = server.post("/resources").json(&body).await.json();
        let id = created["id"].as_str().unwrap();

        let mut replacement = article_json("Eat better", "mental-health");
        replacement.as_object_mut().unwrap().remove("publish_date");
        let updated = server.put(&format!("/resources/{id}")).json(&replacement).await;
        updated.assert_status_ok();
        let updated: Value = updated.json();
        assert_eq!(updated["category"], "mental health");
        assert_eq!(updated["publish_date"], created["publish_date"]);

        server
            .put(&format!("/resources/{id}"))
            .json(&replacement)
            .await
            .assert_status_bad_request();
    }

    #[test_log::test(tokio::test)]
    async fn test_category_counts_and_delete() {
        let (server, _mail) = create_test_app().await;

        let empty: Value = server.get("/resources/category-counts").await.json();
        assert_eq!(empty, json!({"message": "No categories found"}));

        server.post("/resources").json(&article_json("A", "nutrition")).await;
        let created: Value = server.post("/resources").json(&article_json("B", "nutrition")).await.json();
        server.post("/resources").json(&article_json("C", "disease prevention")).await;

        let counts: Value = server.get("/resources/category-counts").await.json();
        assert_eq!(
            counts,
            json!([
                {"category": "disease prevention", "count": 1},
                {"category": "nutrition", "count": 2}
            ])
        );

        let id = created["id"].as_str().unwrap();
        server.delete(&format!("/resources/{id}")).await.assert_status_ok();
        let gone = server.get(&format!("/resources/{id}")).await;
        gone.assert_status_not_found();
        assert_eq!(gone.json::<Value>()["message"], "Article not found");
    }
}
