//! RX analysis: pick what to analyse, ask the model, return the report.
//!
//! ```text
//! source = latest_order ──► last order's "Customer/Items/Quantities/Prices"
//!          cart         ──► cart summary with prices and usage
//!          text         ──► the pasted prescription text
//!          image        ──► the uploaded photo (text optional)
//!                │
//!                ▼
//!     analyze_or_fallback ──► json | html | pdf
//! ```

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use rxpro_core::{Cart, CoreError};
use rxpro_inference::report::{render_html, render_pdf, IMAGE_ONLY_RX};
use rxpro_inference::{
    analyze_or_fallback, instruction_text, rxpro_report_file_name, InferenceReport,
    InferenceRequest, RxImage, RxInstruction, TransactionSummary,
};

use crate::auth::{CurrentUser, CustomerUser};
use crate::error::{ApiError, ApiResult};
use crate::routes::attachment;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RxSource {
    LatestOrder,
    Cart,
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Json,
    Html,
    Pdf,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub source: RxSource,
    #[serde(default)]
    pub text: Option<String>,
    /// Standard base64, no `data:` prefix.
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_mime: Option<String>,
    #[serde(default)]
    pub instructions: Vec<RxInstruction>,
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub rx_content: String,
    pub instructions: String,
    pub result: String,
    pub transaction: Option<TransactionSummary>,
}

/// What gets sent and what gets printed as "RX Content".
struct RxSubject {
    rx_text: String,
    image: Option<RxImage>,
    transaction: Option<TransactionSummary>,
}

fn decode_image(req: &AnalyzeRequest) -> ApiResult<Option<RxImage>> {
    match (&req.image_base64, &req.image_mime) {
        (Some(data), Some(mime)) => Ok(Some(RxImage::from_base64(mime.as_str(), data)?)),
        (Some(_), None) => Err(ApiError::validation("image_mime is required with image_base64")),
        _ => Ok(None),
    }
}

async fn resolve_subject(
    state: &AppState,
    user: &CurrentUser,
    req: &AnalyzeRequest,
) -> ApiResult<RxSubject> {
    let image = decode_image(req)?;
    let text = req.text.as_deref().map(str::trim).unwrap_or_default().to_string();

    match req.source {
        RxSource::LatestOrder => {
            let order = state
                .db
                .orders()
                .latest_for_customer(&user.username)
                .await?
                .ok_or_else(|| ApiError::not_found("Orders for customer", &user.username))?;
            Ok(RxSubject {
                rx_text: order.rx_text(),
                image,
                transaction: Some(TransactionSummary::from(&order)),
            })
        }
        RxSource::Cart => {
            let cart = state
                .sessions
                .with_cart(&user.session_id, Cart::clone)
                .ok_or_else(|| ApiError::unauthorized("Session has ended, please log in again"))?;
            if cart.is_empty() {
                return Err(CoreError::CartEmpty.into());
            }
            Ok(RxSubject {
                rx_text: cart.summary_text(&state.config.store.currency_symbol),
                image,
                transaction: None,
            })
        }
        RxSource::Text => {
            if text.is_empty() {
                return Err(ApiError::validation("Please enter the RX text to analyse"));
            }
            Ok(RxSubject {
                rx_text: text,
                image,
                transaction: None,
            })
        }
        RxSource::Image => {
            if image.is_none() {
                return Err(ApiError::validation("Please upload an RX image"));
            }
            Ok(RxSubject {
                rx_text: text,
                image,
                transaction: None,
            })
        }
    }
}

/// `POST /api/rx/analyze`
pub async fn analyze(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<Response> {
    let subject = resolve_subject(&state, &user, &req).await?;
    let instructions = instruction_text(&req.instructions);

    let rx_content = if subject.rx_text.is_empty() {
        IMAGE_ONLY_RX.to_string()
    } else {
        subject.rx_text.clone()
    };

    info!(
        username = %user.username,
        source = ?req.source,
        checks = req.instructions.len(),
        "Running RX analysis"
    );

    let inference_request = InferenceRequest {
        rx_text: subject.rx_text,
        instructions: instructions.clone(),
        image: subject.image,
    };
    let result = analyze_or_fallback(state.inference.as_ref(), &inference_request).await;

    let report = InferenceReport {
        store: state.config.store.name.clone(),
        customer: user.username.clone(),
        date: Local::now().date_naive(),
        rx_content,
        instructions,
        result,
        transaction: subject.transaction,
    };

    let response = match req.format {
        ReportFormat::Json => Json(AnalyzeResponse {
            rx_content: report.rx_content,
            instructions: report.instructions,
            result: report.result,
            transaction: report.transaction,
        })
        .into_response(),
        ReportFormat::Html => Html(render_html(&report)).into_response(),
        ReportFormat::Pdf => {
            let bytes = render_pdf(&report)?;
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        attachment(&rxpro_report_file_name(&user.username)),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
    };

    Ok(response)
}
