pub mod fetcher;

use serde_json::Value;
use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use self::fetcher::Fetcher;
use crate::environment::Environment;
use crate::HashMap;

pub use jsonv_schema::{Schema, SchemaError};
pub use jsonv_schema_validator::{Error as ValidationError, JsonSchemaValidator};

/// Compile-once, validate-many store: loads a schema by URL, resolves its
/// references and caches the resulting validator.
#[derive(Clone)]
pub struct Schemas<E: Environment> {
    fetcher: Fetcher<E>,
    validators: Arc<Mutex<HashMap<Url, Arc<JsonSchemaValidator>>>>,
}

impl<E: Environment> Schemas<E> {
    pub fn new(env: E) -> Self {
        Self {
            fetcher: Fetcher::new(env),
            validators: Arc::new(Mutex::new(HashMap::default())),
        }
    }

    pub fn set_cache_path(&self, path: Option<Url>) {
        tracing::info!("set cache path {:?}", path.as_ref().map(|v| v.as_str()));
        self.fetcher.set_cache_path(path);
    }

    #[tracing::instrument(skip_all, fields(%schema_uri))]
    pub async fn validate(
        &self,
        schema_uri: &Url,
        value: &Value,
    ) -> Result<Vec<ValidationError>, anyhow::Error> {
        let validator = self.load_validator(schema_uri).await?;
        Ok(validator.validate(value))
    }

    pub async fn load_validator(
        &self,
        schema_uri: &Url,
    ) -> Result<Arc<JsonSchemaValidator>, anyhow::Error> {
        if let Some(validator) = self.validators.lock().get(schema_uri).cloned() {
            return Ok(validator);
        }
        let validator = match self.build_validator(schema_uri).await {
            Ok(validator) => Arc::new(validator),
            Err(error) => {
                tracing::warn!(?error, "failed to load schema");
                return Err(error);
            }
        };
        self.validators
            .lock()
            .insert(schema_uri.clone(), validator.clone());
        Ok(validator)
    }

    async fn build_validator(
        &self,
        schema_uri: &Url,
    ) -> Result<JsonSchemaValidator, anyhow::Error> {
        let raw = self.fetcher.fetch_document(schema_uri).await?;
        let schema = jsonv_schema::compile(&raw)?;
        let schema = jsonv_schema::resolve(schema, &self.fetcher).await?;
        Ok(JsonSchemaValidator::new(schema)?)
    }
}
