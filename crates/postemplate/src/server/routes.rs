use std::path::{Path as FsPath, PathBuf};

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Utc;
use postemplate_core::download_cache::{DownloadArtifact, DownloadToken};
use postemplate_core::outputs::download_filename;
use postemplate_core::reference::load_reference_dataset;
use postemplate_core::{generate_template, GeneratedTemplate, PipelineError};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::page::{self, PageView};
use super::state::AppState;

const FILE_FIELD: &str = "file";
const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

#[derive(Debug)]
pub enum ApiError {
    MissingFilePart,
    NoSelectedFile,
    UnsupportedFileType(String),
    Multipart(MultipartError),
    ReferenceDataMissing(PathBuf),
    Processing(PipelineError),
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ReferenceDataMissing { path } => ApiError::ReferenceDataMissing(path),
            other => ApiError::Processing(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingFilePart => {
                (StatusCode::BAD_REQUEST, "Error: No file part".to_string())
            }
            ApiError::NoSelectedFile => {
                (StatusCode::BAD_REQUEST, "Error: No selected file".to_string())
            }
            ApiError::UnsupportedFileType(name) => (
                StatusCode::BAD_REQUEST,
                format!("Error: '{name}' is not an Excel workbook. Upload an .xlsx or .xls file."),
            ),
            ApiError::Multipart(err) => (err.status(), format!("Error: {}", err.body_text())),
            ApiError::ReferenceDataMissing(path) => {
                error!(path = %path.display(), "Reference dataset is missing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!(
                        "Error: Basis file '{}' not found. Place the reference dataset at that path and retry.",
                        path.display()
                    ),
                )
            }
            ApiError::Processing(err) => {
                error!("template generation failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An error occurred during file processing: {err}"),
                )
            }
            ApiError::Internal(message) => {
                error!("upload handler failed: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An error occurred during file processing: {message}"),
                )
            }
        };

        (status, message).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub token: Option<String>,
    pub uncategorized: Option<String>,
}

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let Some(raw_token) = query.token.as_deref() else {
        return Html(page::render(&PageView::Upload { notice: None }));
    };

    let filename = DownloadToken::parse(raw_token)
        .and_then(|token| state.downloads.peek_filename(&token, Utc::now()));

    let html = match filename {
        Some(filename) => page::render(&PageView::Ready {
            token: raw_token,
            filename: &filename,
            uncategorized: query.uncategorized.as_deref() == Some("true"),
        }),
        None => page::render(&PageView::Upload {
            notice: Some("That download has expired or was already retrieved. Upload the file again."),
        }),
    };
    Html(html)
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::MissingFilePart)?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(ApiError::Multipart)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(ApiError::Multipart)?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload.ok_or(ApiError::MissingFilePart)?;
    if filename.is_empty() {
        return Err(ApiError::NoSelectedFile);
    }
    if !has_workbook_extension(&filename) {
        warn!(filename = %filename, "Rejected upload with unsupported extension");
        return Err(ApiError::UnsupportedFileType(filename));
    }

    let basis_path = state.settings.basis_path.clone();
    let pricing = state.pricing;
    let generated = tokio::task::spawn_blocking(move || -> Result<GeneratedTemplate, PipelineError> {
        let basis = load_reference_dataset(&basis_path)?;
        generate_template(&bytes, &basis, &pricing)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("processing task failed: {err}")))??;

    let artifact = DownloadArtifact {
        filename: download_filename(&filename),
        contents: generated.csv,
    };
    let token = state.downloads.insert(artifact, Utc::now());

    info!(
        uploaded = %filename,
        %token,
        had_unmatched = generated.had_unmatched,
        "Stored generated template for download"
    );

    Ok(Redirect::to(&format!(
        "/?token={token}&uncategorized={}",
        generated.had_unmatched
    )))
}

pub async fn download(State(state): State<AppState>, Path(raw_token): Path<String>) -> Response {
    let artifact = DownloadToken::parse(&raw_token)
        .and_then(|token| state.downloads.take(&token, Utc::now()));

    match artifact {
        Some(DownloadArtifact { filename, contents }) => {
            info!(filename = %filename, bytes = contents.len(), "Serving generated template");
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                contents,
            )
                .into_response()
        }
        None => Redirect::to("/").into_response(),
    }
}

fn has_workbook_extension(filename: &str) -> bool {
    FsPath::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}
