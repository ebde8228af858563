use crate::errors::AppError;
use crate::models::{
    DeleteRequest, IdInput, ListQuery, NewRequest, Priority, PriorityUpdateRequest, Record, Status,
    StatusUpdateRequest, SubmitRequest, SuccessResponse, VisitSummary,
};
use crate::service::{self, RequestFilter};
use crate::state::AppState;
use crate::stats::visitor_address;
use crate::ui::{APP_JS, DASHBOARD_HTML, INDEX_HTML};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ConnectInfo, Query, State,
    },
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
    Json,
};
use std::net::SocketAddr;
use tracing::{info, warn};

const EXPORT_FILENAME: &str = "demandes_france_services.csv";

pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Html<&'static str> {
    let visitor = visitor_address(&headers, peer.map(|ConnectInfo(addr)| addr));
    state.visits.record_visit(&visitor).await;
    Html(INDEX_HTML)
}

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

pub async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
}

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(payload) = payload?;
    let request = validate_submission(payload).inspect_err(|err| {
        warn!("submission rejected: {}", err.message);
    })?;

    let record = state.records.insert(request).await?;
    info!(
        "request {} saved for {} ({})",
        record.id, record.name, record.service
    );
    Ok(Json(SuccessResponse::ok()))
}

pub async fn get_data(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Record>>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::from(rejection).for_read())?;
    let filter = RequestFilter::from_query(&query).map_err(AppError::for_read)?;
    let records = state.records.load().await.map_err(AppError::for_read)?;
    Ok(Json(service::list(records, &filter)))
}

pub async fn update_status(
    State(state): State<AppState>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(payload) = payload?;
    let (id, raw_status) = match (payload.id, present(payload.statut)) {
        (Some(id), Some(status)) if !id.is_blank() => (id, status),
        _ => return Err(rejected(AppError::bad_request("ID ou Statut manquant"))),
    };
    let status = raw_status
        .parse::<Status>()
        .map_err(|err| rejected(AppError::bad_request(format!("Statut inconnu : {}", err.0))))?;

    service::set_status(&state.records, target_id(&id)?, status)
        .await
        .map_err(rejected)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn update_priority(
    State(state): State<AppState>,
    payload: Result<Json<PriorityUpdateRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(payload) = payload?;
    let (id, raw_priority) = match (payload.id, present(payload.priorite)) {
        (Some(id), Some(priority)) if !id.is_blank() => (id, priority),
        _ => return Err(rejected(AppError::bad_request("ID ou Priorité manquant"))),
    };
    let priority = raw_priority.parse::<Priority>().map_err(|err| {
        rejected(AppError::bad_request(format!("Priorité inconnue : {}", err.0)))
    })?;

    service::set_priority(&state.records, target_id(&id)?, priority)
        .await
        .map_err(rejected)?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn delete_request(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(payload) = payload?;
    let id = match payload.id {
        Some(id) if !id.is_blank() => id,
        _ => return Err(rejected(AppError::bad_request("ID manquant"))),
    };
    let id = target_id(&id)?;

    service::delete(&state.records, id).await.map_err(rejected)?;
    Ok(Json(SuccessResponse::with_message(format!(
        "Demande {id} supprimée."
    ))))
}

pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bytes = state.records.export().await.map_err(AppError::for_read)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        bytes,
    ))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<VisitSummary>, AppError> {
    let summary = state.visits.read_summary().await.map_err(AppError::for_read)?;
    Ok(Json(summary))
}

fn validate_submission(payload: SubmitRequest) -> Result<NewRequest, AppError> {
    let missing = || AppError::bad_request("Champs obligatoires manquants ou service non sélectionné");

    Ok(NewRequest {
        name: present(payload.nom).ok_or_else(missing)?,
        email: present(payload.email).ok_or_else(missing)?,
        subject: present(payload.sujet).ok_or_else(missing)?,
        service: present(payload.service).ok_or_else(missing)?,
        message: present(payload.message).ok_or_else(missing)?,
        phone: present(payload.telephone).unwrap_or_default(),
    })
}

/// Trimmed value, `None` when absent or blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Ids that cannot be parsed can never match a stored record.
fn target_id(id: &IdInput) -> Result<u64, AppError> {
    id.as_id()
        .ok_or_else(|| rejected(AppError::not_found("Demande non trouvée")))
}

fn rejected(err: AppError) -> AppError {
    if err.status.is_client_error() {
        warn!("request rejected: {}", err.message);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorShape;
    use axum::http::{StatusCode, Uri};

    fn submission() -> SubmitRequest {
        SubmitRequest {
            nom: Some(" Dupont ".into()),
            email: Some("d@x.fr".into()),
            telephone: None,
            sujet: Some("Permis".into()),
            service: Some("Urbanisme".into()),
            message: Some("Bonjour".into()),
        }
    }

    #[test]
    fn submission_requires_all_but_phone() {
        let request = validate_submission(submission()).unwrap();
        assert_eq!(request.name, "Dupont");
        assert_eq!(request.phone, "");

        let mut missing_service = submission();
        missing_service.service = Some("   ".into());
        let err = validate_submission(missing_service).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let mut missing_message = submission();
        missing_message.message = None;
        assert!(validate_submission(missing_message).is_err());
    }

    #[test]
    fn malformed_query_maps_to_read_error() {
        let uri: Uri = "/api/data?statut=Nouveau&statut=Traitee".parse().unwrap();
        let rejection = Query::<ListQuery>::try_from_uri(&uri).unwrap_err();
        let err = AppError::from(rejection).for_read();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.shape, ErrorShape::Read);
        assert!(err.message.contains("statut"));
    }

    #[test]
    fn unparseable_ids_are_not_found() {
        let err = target_id(&IdInput::Text("abc".into())).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(target_id(&IdInput::Text(" 17 ".into())).unwrap(), 17);
    }
}
