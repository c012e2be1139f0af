//! Environment/runtime helpers
//!
//! Sanity checks run once at startup.

use tracing::warn;

/// Warn when the dashboard bundle is missing; API routes keep working without it.
pub async fn ensure_env(frontend_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(frontend_dir).await.is_err() {
        warn!(%frontend_dir, "frontend assets directory not found; dashboard pages will 404");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_env;

    #[tokio::test]
    async fn missing_frontend_is_not_fatal() {
        assert!(ensure_env("/definitely/not/here").await.is_ok());
    }
}
