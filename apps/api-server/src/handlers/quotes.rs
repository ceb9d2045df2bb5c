//! Quote bank handlers.

use actix_web::{HttpResponse, web};

use scriptorium_core::DomainError;
use scriptorium_core::domain::{LengthClass, Quote};
use scriptorium_shared::dto::{
    Pagination, QuoteListResponse, QuoteRecord, QuoteResponse, UploadQuotesRequest,
    UploadQuotesResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MAX_PAGE_SIZE: usize = 500;

fn to_response(quote: Quote) -> QuoteResponse {
    QuoteResponse {
        id: quote.id,
        quote: quote.text,
        theme: quote.theme,
        tone: quote.tone,
        length: quote.length.to_string(),
        visual_keywords: quote.visual_keywords,
        last_selected_at: quote.last_selected_at,
        times_selected: quote.times_selected,
    }
}

/// GET /api/quotes?skip=0&limit=50
pub async fn list_quotes(
    state: web::Data<AppState>,
    query: web::Query<Pagination>,
) -> AppResult<HttpResponse> {
    let Pagination { skip, limit } = query.into_inner();
    let limit = limit.min(MAX_PAGE_SIZE);

    let quotes = state.quotes.list().await?;
    let total = quotes.len();
    let page = quotes.into_iter().skip(skip).take(limit).map(to_response).collect();

    Ok(HttpResponse::Ok().json(QuoteListResponse {
        quotes: page,
        total,
        skip,
        limit,
    }))
}

fn parse_record(index: usize, record: QuoteRecord) -> Result<Quote, String> {
    let invalid = |e: DomainError| match e {
        DomainError::Validation(msg) => format!("record {index}: {msg}"),
        other => format!("record {index}: {other}"),
    };

    let length: LengthClass = record.length.parse().map_err(invalid)?;

    for (field, value) in [("theme", &record.theme), ("tone", &record.tone)] {
        if value.trim().is_empty() {
            return Err(format!("record {index}: {field} must not be empty"));
        }
    }

    Quote::new(
        record.quote,
        record.theme,
        record.tone,
        length,
        record.visual_keywords.into_vec(),
    )
    .map_err(invalid)
}

/// POST /api/quotes/upload - replaces the whole quote bank.
pub async fn upload_quotes(
    state: web::Data<AppState>,
    body: web::Json<UploadQuotesRequest>,
) -> AppResult<HttpResponse> {
    let records = body.into_inner().quotes;
    if records.is_empty() {
        return Err(AppError::Validation(vec!["no quotes provided".to_string()]));
    }

    let mut quotes = Vec::with_capacity(records.len());
    let mut errors = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        match parse_record(index, record) {
            Ok(quote) => quotes.push(quote),
            Err(e) => errors.push(e),
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let count = state.quotes.replace_all(quotes).await?;
    tracing::info!(count, "Quote bank replaced");

    Ok(HttpResponse::Created().json(UploadQuotesResponse { count }))
}
