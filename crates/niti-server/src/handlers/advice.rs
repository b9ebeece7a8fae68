//! Pipeline handlers: context analysis, wisdom matching, prompt assembly

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState, MAX_EXPENSES};
use niti_core::{
    BudgetRecord, ContextOverrides, ExpenseRecord, FinancialContext, PromptMessages,
    WisdomResult,
};

/// Request body shared by all pipeline endpoints
#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
    /// Values that replace computed context fields
    #[serde(default)]
    pub overrides: Option<ContextOverrides>,
    /// Reference date for "current month" (defaults to the server's local date)
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Request body for wisdom and prompt endpoints
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(flatten)]
    pub data: ContextRequest,
}

/// Response for POST /api/wisdom
#[derive(Debug, Serialize)]
pub struct WisdomResponse {
    pub context: FinancialContext,
    pub wisdom: WisdomResult,
}

/// Response for POST /api/prompt
#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
    pub messages: PromptMessages,
    pub primary_principle: String,
}

/// POST /api/context - Analyze expenses and budgets
pub async fn analyze_context(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContextRequest>,
) -> Result<Json<FinancialContext>, AppError> {
    Ok(Json(analyze(&state, &req)?))
}

/// POST /api/wisdom - Context plus ranked principles for a query
pub async fn find_wisdom(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<WisdomResponse>, AppError> {
    let query = require_query(&req.query)?;
    let context = analyze(&state, &req.data)?;
    let wisdom = state.advisor.find_relevant_wisdom(&context, query);

    Ok(Json(WisdomResponse { context, wisdom }))
}

/// POST /api/prompt - Full prompt for a text-generation backend
pub async fn build_prompt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<PromptResponse>, AppError> {
    let query = require_query(&req.query)?;
    let context = analyze(&state, &req.data)?;
    let wisdom = state.advisor.find_relevant_wisdom(&context, query);

    let assembler = state.advisor.assembler();
    Ok(Json(PromptResponse {
        prompt: assembler.build_prompt(query, &context, &wisdom),
        messages: assembler.build_messages(query, &context, &wisdom),
        primary_principle: wisdom.primary.principle.id.clone(),
    }))
}

/// The query is passed through verbatim, but must contain something
fn require_query(query: &str) -> Result<&str, AppError> {
    if query.trim().is_empty() {
        return Err(AppError::bad_request("Query must not be empty"));
    }
    Ok(query)
}

fn analyze(state: &AppState, req: &ContextRequest) -> Result<FinancialContext, AppError> {
    validate(req)?;

    let today = req
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    debug!(
        expenses = req.expenses.len(),
        budgets = req.budgets.len(),
        %today,
        "Analyzing request"
    );

    Ok(state
        .advisor
        .analyze(&req.expenses, &req.budgets, req.overrides.as_ref(), today))
}

fn validate(req: &ContextRequest) -> Result<(), AppError> {
    if req.expenses.len() > MAX_EXPENSES {
        return Err(AppError::bad_request("Too many expense records"));
    }
    if req
        .expenses
        .iter()
        .any(|e| !e.amount.is_finite() || e.amount <= 0.0)
    {
        return Err(AppError::bad_request("Expense amounts must be positive numbers"));
    }
    if req.expenses.iter().any(|e| e.category.trim().is_empty()) {
        return Err(AppError::bad_request("Expense category must not be empty"));
    }
    if req
        .budgets
        .iter()
        .any(|b| !b.limit.is_finite() || b.limit < 0.0)
    {
        return Err(AppError::bad_request(
            "Budget limits must be non-negative numbers",
        ));
    }
    let income = req.overrides.as_ref().and_then(|o| o.monthly_income);
    if income.is_some_and(|i| !i.is_finite() || i <= 0.0) {
        return Err(AppError::bad_request("Monthly income must be a positive number"));
    }
    Ok(())
}
