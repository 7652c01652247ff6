use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared HTTP requests.
///
/// History clients are generic over this so the transport (timeouts,
/// proxies, test doubles) is chosen by the caller.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

