use std::future::Future;

use granula_core::errors::{GranulaError, GranulaResult};
use granula_core::CancellationToken;

/// Run `fut` unless `token` fires first.
pub(crate) async fn race<F: Future>(
    token: &CancellationToken,
    stage: &str,
    fut: F,
) -> GranulaResult<F::Output> {
    if token.is_cancelled() {
        return Err(cancelled(stage));
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(cancelled(stage)),
        out = fut => Ok(out),
    }
}

pub(crate) fn cancelled(stage: &str) -> GranulaError {
    GranulaError::Cancelled {
        stage: stage.to_string(),
    }
}
