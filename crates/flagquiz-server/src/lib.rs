//! flagquiz-server — the answer-validation HTTP service.
//!
//! Serves `POST /api/quiz` over a read-only answer store. Expected answers
//! never leave the process; clients only learn `{"correct": bool}`.

pub mod error;
pub mod routes;
pub mod service;

pub use error::{ApiError, ServerError};
pub use routes::{build_router, AppState};
pub use service::QuizServer;
