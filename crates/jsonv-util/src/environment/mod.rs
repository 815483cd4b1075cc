use async_trait::async_trait;
use url::Url;

#[cfg(not(target_family = "wasm"))]
pub mod native;

/// An environment in which schema documents are read, written and fetched.
///
/// This is mostly needed for sandboxed environments such as WebAssembly.
#[async_trait(?Send)]
pub trait Environment: Clone + Send + Sync + 'static {
    fn env_var(&self, name: &str) -> Option<String>;

    fn atty_stderr(&self) -> bool;

    async fn read_file(&self, path: &Url) -> Result<Vec<u8>, anyhow::Error>;

    async fn write_file(&self, path: &Url, bytes: &[u8]) -> Result<(), anyhow::Error>;

    async fn fetch_file(&self, url: &Url) -> Result<Vec<u8>, anyhow::Error>;
}
