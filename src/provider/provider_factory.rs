use std::sync::Arc;

use anyhow::Result;

use super::MetricsProvider;

#[cfg(feature = "cloudwatch")]
pub async fn create_provider(
    region: Option<&str>,
    profile: Option<&str>,
) -> Result<Arc<dyn MetricsProvider>> {
    let provider = super::cloudwatch::CloudWatchProvider::connect(region, profile).await?;
    Ok(Arc::new(provider))
}

// Provide a helpful error message when the backend is disabled
#[cfg(not(feature = "cloudwatch"))]
pub async fn create_provider(
    _region: Option<&str>,
    _profile: Option<&str>,
) -> Result<Arc<dyn MetricsProvider>> {
    anyhow::bail!("CloudWatch provider is not enabled. Enable with --features cloudwatch")
}
