//! Post generation, review and export handlers.

use std::collections::HashMap;
use std::future::Future;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use uuid::Uuid;

use scriptorium_core::DomainError;
use scriptorium_core::domain::Post;
use scriptorium_shared::dto::{GenerateRequest, PostListResponse, PostResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_response(post: Post, quote_text: Option<String>) -> PostResponse {
    PostResponse {
        id: post.id,
        quote_id: post.quote_id,
        quote_text,
        image_base64: STANDARD.encode(&post.image),
        caption: post.caption,
        hashtags: post.hashtags,
        call_to_action: post.call_to_action,
        full_caption: post.full_caption,
        status: post.status.to_string(),
        forced_repeat: post.forced_repeat,
        created_at: post.created_at,
        approved_at: post.approved_at,
    }
}

async fn with_quote(state: &AppState, post: Post) -> AppResult<PostResponse> {
    let quote_text = state.quotes.get(post.quote_id).await?.map(|q| q.text);
    Ok(to_response(post, quote_text))
}

async fn with_quotes(state: &AppState, posts: Vec<Post>) -> AppResult<PostListResponse> {
    let texts: HashMap<Uuid, String> = state
        .quotes
        .list()
        .await?
        .into_iter()
        .map(|q| (q.id, q.text))
        .collect();

    let posts: Vec<PostResponse> = posts
        .into_iter()
        .map(|post| {
            let text = texts.get(&post.quote_id).cloned();
            to_response(post, text)
        })
        .collect();

    Ok(PostListResponse {
        total: posts.len(),
        posts,
    })
}

/// Run a pipeline step on its own task so a client disconnect cannot drop it half-way.
async fn detached<F, T>(step: F) -> AppResult<T>
where
    F: Future<Output = Result<T, DomainError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(step)
        .await
        .map_err(|e| AppError::Internal(format!("generation task failed: {e}")))?
        .map_err(AppError::from)
}

/// POST /api/posts/generate
pub async fn generate(
    state: web::Data<AppState>,
    body: Option<web::Json<GenerateRequest>>,
) -> AppResult<HttpResponse> {
    let quote_id = body.and_then(|b| b.into_inner().quote_id);

    let orchestrator = state.orchestrator.clone();
    let post = detached(async move { orchestrator.generate(quote_id).await }).await?;

    Ok(HttpResponse::Created().json(with_quote(&state, post).await?))
}

/// POST /api/posts/{id}/regenerate
pub async fn regenerate(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let lifecycle = state.lifecycle.clone();
    let post = detached(async move { lifecycle.regenerate(post_id).await }).await?;

    Ok(HttpResponse::Ok().json(with_quote(&state, post).await?))
}

/// GET /api/posts/queue - pending posts, newest first.
pub async fn list_queue(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.lifecycle.list_pending().await?;
    Ok(HttpResponse::Ok().json(with_quotes(&state, posts).await?))
}

/// GET /api/posts/approved
pub async fn list_approved(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.lifecycle.list_approved().await?;
    Ok(HttpResponse::Ok().json(with_quotes(&state, posts).await?))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.lifecycle.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(with_quote(&state, post).await?))
}

/// POST /api/posts/{id}/approve
pub async fn approve(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.lifecycle.approve(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(with_quote(&state, post).await?))
}

/// GET /api/posts/{id}/download
pub async fn download(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let bundle = state.packager.package(path.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .content_type(bundle.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(bundle.file_name)],
        })
        .body(bundle.bytes))
}
