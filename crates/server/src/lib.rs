//! recall HTTP API
//!
//! Exposes saving and searching a per-user page archive over JSON.
//!
//! - `POST /api/v1/save`: body `{url, title, text, user_id}` (`text_content`
//!   is accepted for `text`). Responds `{"saved": true, ...}` for a new page
//!   and `{"saved": false, ...}` for a near-duplicate. Missing fields are a 400.
//! - `POST /api/v1/search`: body `{user_id, query}`; ranked documents with
//!   the chunks that matched.
//! - `GET /api/v1/users/{user_id}/documents?before=&limit=`: newest
//!   first, with a `next_before` cursor while more pages remain.
//! - `GET /api/v1/users/{user_id}/documents/{document_id}`: stored snapshot.
//! - `GET /health`, `GET /ready`, `GET /metrics` (Prometheus text format).
//!
//! Validation errors map to 400, embedding failures to 502 and storage
//! failures to 503.
//!
//! Configuration comes from `.env`, an optional `server.{toml,yaml}` and
//! `RECALL_SERVER__*` variables; `recall_config` points at the archive's YAML.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
