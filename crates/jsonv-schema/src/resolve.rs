use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use either::Either;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use indexmap::IndexMap;
use serde_json::Value;

use crate::compile::Compiler;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::{
    BoolOrSchema, Dependency, OneOrMultiSchemas, RefNode, Schema, SchemaNode,
};

/// The injected remote-fetch capability. Any failure is uniform: the
/// resolver does not interpret status codes and never retries.
#[async_trait(?Send)]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<Value, anyhow::Error>;
}

/// Replace every `Ref` node in `schema` with its compiled target subtree,
/// chasing reference chains transitively and fetching remote documents
/// through `fetch`. Fails with [`SchemaError::CircularReference`] when a
/// chain revisits a reference currently being resolved.
///
/// A tree without `Ref` nodes is returned unchanged and performs no I/O, so
/// resolution is idempotent.
pub async fn resolve<F: Fetch>(schema: Schema, fetch: &F) -> SchemaResult<Schema> {
    let mut resolver = Resolver {
        fetch,
        in_progress: HashSet::new(),
        resolved: HashMap::new(),
        documents: HashMap::new(),
    };
    resolver.resolve_schema(schema).await
}

/// Document URL (`None` is the caller-supplied root) plus pointer segments.
type RefIdentity = (Option<String>, Vec<String>);

struct Resolver<'a, F: Fetch> {
    fetch: &'a F,
    /// One shared set for the whole call, so two references entering the
    /// same cyclic chain from different points both detect the cycle.
    in_progress: HashSet<RefIdentity>,
    resolved: HashMap<RefIdentity, Schema>,
    documents: HashMap<String, Arc<Value>>,
}

impl<'f, F: Fetch> Resolver<'f, F> {
    fn resolve_schema(&mut self, schema: Schema) -> LocalBoxFuture<'_, SchemaResult<Schema>> {
        async move {
            let mut schema = schema;
            if let SchemaNode::Ref(ref_node) = schema.node {
                // `$ref` is exclusive, the whole node is replaced
                return self.chase(*ref_node).await;
            }
            schema.not = match schema.not {
                Some(sub) => Some(Box::new(self.resolve_schema(*sub).await?)),
                None => None,
            };
            schema.all_of = self.resolve_list(schema.all_of).await?;
            schema.any_of = self.resolve_list(schema.any_of).await?;
            schema.one_of = self.resolve_list(schema.one_of).await?;
            schema.node = self.resolve_node(schema.node).await?;
            Ok(schema)
        }
        .boxed_local()
    }

    fn resolve_node(&mut self, node: SchemaNode) -> LocalBoxFuture<'_, SchemaResult<SchemaNode>> {
        async move {
            Ok(match node {
                SchemaNode::Array(mut array) => {
                    array.items = match array.items {
                        Some(items) => Some(OneOrMultiSchemas {
                            value: match items.value {
                                Either::Left(schema) => {
                                    Either::Left(Box::new(self.resolve_schema(*schema).await?))
                                }
                                Either::Right(schemas) => {
                                    let mut result = Vec::with_capacity(schemas.len());
                                    for schema in schemas {
                                        result.push(self.resolve_schema(schema).await?);
                                    }
                                    Either::Right(result)
                                }
                            },
                        }),
                        None => None,
                    };
                    array.additional_items =
                        self.resolve_bool_or_schema(array.additional_items).await?;
                    array.contains = match array.contains {
                        Some(schema) => Some(self.resolve_schema(schema).await?),
                        None => None,
                    };
                    SchemaNode::Array(array)
                }
                SchemaNode::Object(mut object) => {
                    object.properties = self.resolve_map(object.properties).await?;
                    object.pattern_properties =
                        self.resolve_map(object.pattern_properties).await?;
                    object.additional_properties = self
                        .resolve_bool_or_schema(object.additional_properties)
                        .await?;
                    object.dependencies = match object.dependencies {
                        Some(deps) => {
                            let mut result = IndexMap::with_capacity(deps.len());
                            for (name, dependency) in deps {
                                let dependency = match dependency.value {
                                    Either::Left(names) => Dependency {
                                        value: Either::Left(names),
                                    },
                                    Either::Right(schema) => Dependency {
                                        value: Either::Right(Box::new(
                                            self.resolve_schema(*schema).await?,
                                        )),
                                    },
                                };
                                result.insert(name, dependency);
                            }
                            Some(result)
                        }
                        None => None,
                    };
                    SchemaNode::Object(object)
                }
                SchemaNode::Union(members) => {
                    let mut result = Vec::with_capacity(members.len());
                    for member in members {
                        result.push(self.resolve_node(member).await?);
                    }
                    SchemaNode::Union(result)
                }
                // Ref is handled one level up; the rest hold no subschemas
                other => other,
            })
        }
        .boxed_local()
    }

    async fn chase(&mut self, ref_node: RefNode) -> SchemaResult<Schema> {
        let RefNode {
            reference,
            root,
            base_url,
        } = ref_node;
        let document_url = reference.url.clone().or(base_url);
        let identity: RefIdentity = (document_url.clone(), reference.segments.clone());
        if let Some(done) = self.resolved.get(&identity) {
            return Ok(done.clone());
        }
        if !self.in_progress.insert(identity.clone()) {
            return Err(SchemaError::CircularReference {
                reference: reference.to_string(),
            });
        }
        let document = match &reference.url {
            Some(url) => self.document(url).await?,
            None => root,
        };
        let target = reference
            .resolve(&document)
            .ok_or_else(|| SchemaError::UnknownRef {
                reference: reference.to_string(),
            })?;
        let compiled = Compiler::new(document.clone(), document_url).compile(target)?;
        // the target may itself be (or contain) a reference, chase it too
        let resolved = self.resolve_schema(compiled).await?;
        self.in_progress.remove(&identity);
        self.resolved.insert(identity, resolved.clone());
        Ok(resolved)
    }

    async fn document(&mut self, url: &str) -> SchemaResult<Arc<Value>> {
        if let Some(document) = self.documents.get(url) {
            return Ok(document.clone());
        }
        let document = self.fetch.fetch(url).await.map_err(|err| {
            SchemaError::ReferenceFetch {
                url: url.to_string(),
                reason: err.to_string(),
            }
        })?;
        let document = Arc::new(document);
        self.documents.insert(url.to_string(), document.clone());
        Ok(document)
    }

    async fn resolve_list(
        &mut self,
        schemas: Option<Vec<Schema>>,
    ) -> SchemaResult<Option<Vec<Schema>>> {
        match schemas {
            None => Ok(None),
            Some(list) => {
                let mut result = Vec::with_capacity(list.len());
                for schema in list {
                    result.push(self.resolve_schema(schema).await?);
                }
                Ok(Some(result))
            }
        }
    }

    async fn resolve_map(
        &mut self,
        map: Option<IndexMap<String, Schema>>,
    ) -> SchemaResult<Option<IndexMap<String, Schema>>> {
        match map {
            None => Ok(None),
            Some(map) => {
                let mut result = IndexMap::with_capacity(map.len());
                for (key, schema) in map {
                    result.insert(key, self.resolve_schema(schema).await?);
                }
                Ok(Some(result))
            }
        }
    }

    async fn resolve_bool_or_schema(
        &mut self,
        value: Option<BoolOrSchema>,
    ) -> SchemaResult<Option<BoolOrSchema>> {
        Ok(match value {
            Some(BoolOrSchema {
                value: Either::Right(schema),
            }) => Some(BoolOrSchema {
                value: Either::Right(Box::new(self.resolve_schema(*schema).await?)),
            }),
            other => other,
        })
    }
}
