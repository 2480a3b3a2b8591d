//! Bearer-header identity middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use retrotrade_core::error::AppError;

use crate::state::AppState;

/// Verifies an `Authorization: Bearer` header when one is present and
/// attaches the resulting [`Identity`](retrotrade_core::types::Identity) as a
/// request extension.
///
/// Requests without the header pass through untouched, so handlers can fall
/// back to other credentials. A header that is present but unusable is
/// rejected with `401 Invalid token`.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(header) = request.headers().get(AUTHORIZATION) {
        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(AppError::invalid_token)?;

        let identity = state.jwt_decoder.decode(token)?.into_identity()?;
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}
