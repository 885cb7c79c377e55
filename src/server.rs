//! HTTP surface: `POST /scrape` returns the exported workbook as a download

use std::io;
use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{web, App, HttpResponse, HttpServer};
use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tower::Service;
use tracing::{debug, error, info, warn};

use crate::error::ScraperError;
use crate::export::XLSX_CONTENT_TYPE;
use crate::service::{ExportedFile, ScrapeRequest, ScraperService};

pub const FAILURE_MESSAGE: &str = "Error al realizar el scraping";

const CHUNK_SIZE: usize = 64 * 1024;

/// `POST /scrape` body
#[derive(Debug, Deserialize)]
pub struct ScrapeBody {
    pub product: String,
    pub pages: Option<u32>,
}

pub struct AppState {
    service: ScraperService,
}

impl AppState {
    pub fn new(service: ScraperService) -> Self {
        Self { service }
    }
}

/// Register routes on an actix `App`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/scrape", web::post().to(scrape))
        .route("/health", web::get().to(health));
}

/// Bind and serve until shutdown.
pub async fn run(service: ScraperService) -> io::Result<()> {
    let addr = (service.config().host.clone(), service.config().port);
    let state = web::Data::new(AppState::new(service));

    info!("Listening on http://{}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind(addr)?
    .run()
    .await
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn scrape(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    match export(&state, &body).await {
        Ok(exported) => match download(exported).await {
            Ok(response) => response,
            Err(e) => failure(e),
        },
        Err(e) => failure(e),
    }
}

async fn export(state: &AppState, body: &[u8]) -> Result<ExportedFile, ScraperError> {
    let body: ScrapeBody = serde_json::from_slice(body)?;
    let pages = body.pages.unwrap_or(state.service.config().default_pages);

    let mut service = state.service.clone();
    service.call(ScrapeRequest::new(body.product, pages)).await
}

/// Stream the file and delete it once the body is finished or dropped.
async fn download(exported: ExportedFile) -> Result<HttpResponse, ScraperError> {
    let guard = RemoveOnDrop(exported.path.clone());
    let file = tokio::fs::File::open(&exported.path).await?;

    info!(
        "Sending {} ({} records)",
        exported.file_name, exported.record_count
    );

    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(attachment(exported.file_name))
        .streaming(file_stream(file, guard)))
}

/// `attachment` disposition with an ASCII `filename` and, for non-ASCII
/// names, a UTF-8 `filename*`.
fn attachment(file_name: String) -> ContentDisposition {
    let mut parameters = Vec::with_capacity(2);

    if file_name.is_ascii() {
        parameters.push(DispositionParam::Filename(file_name));
    } else {
        let fallback: String = file_name
            .chars()
            .map(|c| if c.is_ascii() { c } else { '_' })
            .collect();
        parameters.push(DispositionParam::Filename(fallback));
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: file_name.into_bytes(),
        }));
    }

    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

fn failure(e: ScraperError) -> HttpResponse {
    error!("Scrape failed: {}", e);
    HttpResponse::InternalServerError()
        .content_type("text/plain; charset=utf-8")
        .body(FAILURE_MESSAGE)
}

/// Removes the file at the wrapped path when dropped
struct RemoveOnDrop(PathBuf);

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => debug!("Removed {:?}", self.0),
            Err(e) => warn!("Failed to remove {:?}: {}", self.0, e),
        }
    }
}

// Field order matters: the handle is dropped before the file is removed.
struct Download {
    file: tokio::fs::File,
    _guard: RemoveOnDrop,
}

fn file_stream(
    file: tokio::fs::File,
    guard: RemoveOnDrop,
) -> impl Stream<Item = Result<Bytes, io::Error>> {
    let state = Download {
        file,
        _guard: guard,
    };

    futures::stream::try_unfold(state, |mut state| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = state.file.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok::<_, io::Error>(Some((Bytes::from(buf), state)))
    })
}
