use anyhow::anyhow;
use async_trait::async_trait;
use url::Url;

use super::Environment;

#[derive(Clone, Default)]
pub struct NativeEnvironment;

impl NativeEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl Environment for NativeEnvironment {
    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn atty_stderr(&self) -> bool {
        atty::is(atty::Stream::Stderr)
    }

    async fn read_file(&self, path: &Url) -> Result<Vec<u8>, anyhow::Error> {
        let path = path
            .to_file_path()
            .map_err(|_| anyhow!("invalid file url `{path}`"))?;
        Ok(tokio::fs::read(path).await?)
    }

    async fn write_file(&self, path: &Url, bytes: &[u8]) -> Result<(), anyhow::Error> {
        let path = path
            .to_file_path()
            .map_err(|_| anyhow!("invalid file url `{path}`"))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(tokio::fs::write(path, bytes).await?)
    }

    #[cfg(feature = "fetch")]
    async fn fetch_file(&self, url: &Url) -> Result<Vec<u8>, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let data = client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec();
        Ok(data)
    }

    #[cfg(not(feature = "fetch"))]
    async fn fetch_file(&self, url: &Url) -> Result<Vec<u8>, anyhow::Error> {
        anyhow::bail!("failed to fetch `{url}`, fetch is not supported")
    }
}
