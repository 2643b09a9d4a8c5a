use axum::{
    Json, Router,
    body::Bytes,
    extract::Query,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use icsedit_core::{Error, prelude::*};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 健康检查响应
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// 错误响应
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// 导入请求参数
#[derive(Deserialize)]
struct ImportQuery {
    /// 上传的文件名
    name: Option<String>,
}

/// 导入结果
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportResponse {
    path: ImportPath,
    file_name: Option<String>,
    events: Vec<EventRecord>,
}

/// 导出请求
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest {
    file_name: Option<String>,
    #[serde(default)]
    events: Vec<EventRecord>,
}

pub fn create_app() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/import", post(import_handler))
        .route("/export", post(export_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// 根路径处理器
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "ICS Calendar Viewer & Editor Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Import ICS files as event lists and export event lists as ICS",
        "endpoints": {
            "health": "/health",
            "import": "/import",
            "export": "/export"
        }
    }))
}

/// 健康检查处理器
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 每个请求使用独立的日历
fn import_text(name: Option<String>, text: &str) -> Result<ImportResponse, Error> {
    let mut calendar = Calendar::default();
    let summary = calendar.import(name, text, &mut RandomCategory::new())?;

    Ok(ImportResponse {
        path: summary.path,
        file_name: calendar.file_name().map(str::to_string),
        events: calendar.events().to_vec(),
    })
}

/// 导入处理器：请求体为ICS文本
async fn import_handler(
    Query(params): Query<ImportQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        "导入请求: {}，{} 字节",
        params.name.as_deref().unwrap_or("<未命名>"),
        body.len()
    );

    let text = String::from_utf8_lossy(&body);
    let response = import_text(params.name, &text)?;

    Ok(Json(response))
}

/// 导出处理器：请求体为日程列表JSON
async fn export_handler(Json(request): Json<ExportRequest>) -> Result<impl IntoResponse, AppError> {
    tracing::info!("导出请求: {} 个日程", request.events.len());

    let mut calendar = Calendar::with_events(CalendarOptions::default(), request.events);
    let mut payload = calendar.export();
    if let Some(name) = request.file_name.filter(|n| !n.trim().is_empty()) {
        payload.file_name = name;
    }

    let disposition = format!(
        "attachment; filename=\"{}\"",
        payload.file_name.replace(['"', '\\', '\r', '\n'], "_")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, payload.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload.content,
    ))
}

/// 应用错误类型
#[derive(Debug)]
struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self.0 {
            Error::NoEventsFound => (StatusCode::UNPROCESSABLE_ENTITY, "没有找到日程"),
            Error::DuplicateId(_) => (StatusCode::CONFLICT, "日程id重复"),
            Error::StructuredParse(_) | Error::DateDecode { .. } | Error::Json(_) => {
                (StatusCode::BAD_REQUEST, "请求内容无效")
            }
            Error::Config(_) => (StatusCode::BAD_REQUEST, "配置错误"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "上游请求失败"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "内部服务器错误"),
        };

        if status.is_server_error() {
            tracing::error!("请求失败: {}", self.0);
        } else {
            tracing::warn!("请求被拒绝: {}", self.0);
        }

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            message: self.0.to_string(),
        });

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
