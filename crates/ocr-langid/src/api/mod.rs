//! HTTP front-end.
//!
//! An axum application serving an upload form and the identification routes.
//!
//! # Endpoints
//!
//! - `GET /` - HTML upload form
//! - `POST /identify` - identify an uploaded image, HTML result page
//! - `GET /identify` - notice that the route expects a POST
//! - `POST /api/identify` - identify an uploaded image, JSON result
//! - `GET /health` - health check
//! - `GET /info` - server information
//!
//! # Examples
//!
//! ```no_run
//! use ocr_langid::api::serve_default;
//!
//! #[tokio::main]
//! async fn main() -> ocr_langid::Result<()> {
//!     serve_default().await
//! }
//! ```
//!
//! # cURL Examples
//!
//! ```bash
//! # HTML result page
//! curl -F "image=@scan.png" http://localhost:5000/identify
//!
//! # JSON with a per-request OCR language hint
//! curl -F "image=@scan.png" -F "language=eng+fra" http://localhost:5000/api/identify
//!
//! # Health check
//! curl http://localhost:5000/health
//! ```

mod error;
mod handlers;
pub mod render;
mod server;
mod types;

pub use error::{ApiError, ErrorFormat};
pub use server::{CORS_ORIGINS_ENV, create_router, create_router_with_state, serve, serve_default};
pub use types::{ApiState, ErrorResponse, HealthResponse, IdentifyResponse, InfoResponse};
