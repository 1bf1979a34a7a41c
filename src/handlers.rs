use crate::errors::AppError;
use crate::models::{Bucket, DashboardParams, DashboardResponse, Record, RefreshResponse};
use crate::period::{filter_period, group_by_period, parse_timestamp};
use crate::state::AppState;
use crate::stats::{build_dashboard, build_dashboard_at};
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDateTime};
use tracing::info;

pub async fn index() -> Html<String> {
    Html(render_index(&today_string()))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardResponse>, AppError> {
    let at = parse_at(params.at.as_deref())?;
    let (contacts, leads) = tokio::try_join!(state.contacts(), state.leads())?;
    let dashboard = match at {
        Some(now) => build_dashboard_at(now, &contacts, &leads, params.query()),
        None => build_dashboard(&contacts, &leads, params.query()),
    };
    Ok(Json(dashboard))
}

pub async fn get_contacts(State(state): State<AppState>) -> Result<Json<Vec<Record>>, AppError> {
    let contacts = state.contacts().await?;
    Ok(Json(contacts.to_vec()))
}

pub async fn get_leads(State(state): State<AppState>) -> Result<Json<Vec<Record>>, AppError> {
    let leads = state.leads().await?;
    Ok(Json(leads.to_vec()))
}

pub async fn get_contacts_by_period(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<Bucket>>, AppError> {
    let now = resolve_now(params.at.as_deref())?;
    let contacts = state.contacts().await?;
    let split = filter_period(contacts.iter(), params.period, now, params.realtime);
    Ok(Json(group_by_period(split.current.iter().copied(), params.period)))
}

pub async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    state.invalidate().await;
    info!("record snapshots invalidated");
    Json(RefreshResponse { refreshed: true })
}

fn parse_at(at: Option<&str>) -> Result<Option<NaiveDateTime>, AppError> {
    at.map(|raw| {
        parse_timestamp(raw)
            .ok_or_else(|| AppError::bad_request(format!("invalid 'at' timestamp: {raw}")))
    })
    .transpose()
}

fn resolve_now(at: Option<&str>) -> Result<NaiveDateTime, AppError> {
    Ok(parse_at(at)?.unwrap_or_else(|| Local::now().naive_local()))
}

fn today_string() -> String {
    Local::now().date_naive().to_string()
}
