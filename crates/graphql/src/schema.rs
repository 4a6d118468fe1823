//! GraphQL schema definition.
//!
//! Resolvers only translate the API: arguments become domain keys and
//! filters, and every read goes through the request's `BreedLoaders`.

use async_graphql::{Context, EmptySubscription, Object, Result, Schema, ID};

use kennel_core::error::BreedError;
use kennel_core::metrics::record_favorite_saved;
use kennel_core::models::BreedFilter;

use crate::context::RequestContext;
use crate::errors::{breed_error, invalid_argument};
use crate::relay::GlobalId;
use crate::types::{
    ApiError, Breed, KennelSchema, MutationError, MutationSuccess, Node, ViewerBreedsConnection,
    ViewerSaveFavoriteBreedError, ViewerSaveFavoriteBreedInput, ViewerSaveFavoriteBreedPayload,
    ViewerSaveFavoriteBreedSuccess, BREED_TYPE,
};

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// Build the schema with depth and complexity limits.
///
/// The schema holds no data: each operation must carry a
/// [`RequestContext`], see [`crate::execute`].
pub fn build_schema() -> KennelSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        // Only reachable through fragments on the payload union
        .register_output_type::<MutationError>()
        .register_output_type::<MutationSuccess>()
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

/// Breed name behind a global id, if it is a breed id.
fn breed_name_of(id: &ID) -> Option<String> {
    GlobalId::decode(id).and_then(|gid| (gid.type_name == BREED_TYPE).then_some(gid.id))
}

// -----------------------------------------------------------------------------
// Query
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Look up a breed by global id. Null if it does not exist.
    async fn breed_by_id(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Breed>> {
        if id.is_empty() {
            return Err(invalid_argument("breedById requires an ID to be provided"));
        }

        let Some(name) = breed_name_of(&id) else {
            return Ok(None);
        };

        let scope = ctx.data::<RequestContext>()?;
        let breed = scope.loaders.load(&name).await.map_err(breed_error)?;
        Ok(breed.map(Breed::from))
    }

    /// Breeds visible to the viewer. Unset filters match everything.
    async fn breeds(
        &self,
        ctx: &Context<'_>,
        fluffy: Option<bool>,
        favorite: Option<bool>,
    ) -> Result<ViewerBreedsConnection> {
        ViewerBreedsConnection::load(ctx, BreedFilter { fluffy, favorite }).await
    }

    /// Refetch any node by global id.
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Node>> {
        let Some(name) = breed_name_of(&id) else {
            return Ok(None);
        };

        let scope = ctx.data::<RequestContext>()?;
        let breed = scope.loaders.load(&name).await.map_err(breed_error)?;
        Ok(breed.map(|b| Node::Breed(Breed::from(b))))
    }
}

// -----------------------------------------------------------------------------
// Mutation
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Save a breed as one of the viewer's favorites.
    ///
    /// Expected failures come back as `ViewerSaveFavoriteBreedError`;
    /// infrastructure failures are GraphQL errors.
    async fn viewer_save_favorite_breed(
        &self,
        ctx: &Context<'_>,
        input: ViewerSaveFavoriteBreedInput,
    ) -> Result<ViewerSaveFavoriteBreedPayload> {
        let ViewerSaveFavoriteBreedInput {
            client_mutation_id,
            breed_id,
        } = input;
        let scope = ctx.data::<RequestContext>()?;

        let outcome = match breed_name_of(&breed_id) {
            Some(name) => scope.loaders.make_favorite(&name).await,
            None => Err(BreedError::NotFound(breed_id.0)),
        };

        match outcome {
            Ok(breed_name) => {
                record_favorite_saved();
                Ok(ViewerSaveFavoriteBreedPayload::Success(
                    ViewerSaveFavoriteBreedSuccess {
                        client_mutation_id,
                        breed_name,
                    },
                ))
            }
            Err(err) => match ApiError::from_breed_error(&err) {
                Some(error) => Ok(ViewerSaveFavoriteBreedPayload::Error(
                    ViewerSaveFavoriteBreedError {
                        client_mutation_id,
                        error,
                    },
                )),
                None => Err(breed_error(err)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_graphql::{Request, Variables};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use kennel_core::error::{FetchError, FetchResult};
    use kennel_core::models::Viewer;
    use kennel_core::ports::{BreedSource, Cursor};
    use kennel_storage::InMemoryFavorites;

    use crate::context::{execute, ContextBuilder};
    use crate::relay::to_global_id;

    #[derive(Default)]
    struct MockSource {
        breeds: HashMap<String, Vec<String>>,
        order: Vec<String>,
        fail_images: bool,
        list_calls: AtomicUsize,
        image_calls: AtomicUsize,
    }

    impl MockSource {
        fn with(breeds: &[(&str, usize)]) -> Self {
            let mut source = Self::default();
            for (name, count) in breeds {
                let urls = (0..*count)
                    .map(|i| format!("https://images.test/{name}/{i}.jpg"))
                    .collect();
                source.breeds.insert(name.to_string(), urls);
                source.order.push(name.to_string());
            }
            source
        }
    }

    #[async_trait]
    impl BreedSource for MockSource {
        async fn list_breed_names(&self) -> FetchResult<Vec<String>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.order.clone())
        }

        async fn breed_images(&self, breed_name: &str) -> FetchResult<Option<Vec<String>>> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_images {
                return Err(FetchError::Transport("connection reset".into()));
            }
            Ok(self.breeds.get(breed_name).cloned())
        }
    }

    struct Harness {
        schema: KennelSchema,
        contexts: ContextBuilder,
        source: Arc<MockSource>,
    }

    impl Harness {
        fn new(source: MockSource) -> Self {
            let source = Arc::new(source);
            Self {
                schema: build_schema(),
                contexts: ContextBuilder::new(source.clone(), Arc::new(InMemoryFavorites::new())),
                source,
            }
        }

        async fn run(&self, query: &str, variables: Value) -> Value {
            let request = Request::new(query).variables(Variables::from_json(variables));
            let response = execute(
                &self.schema,
                &self.contexts,
                request,
                Viewer::anonymous(),
                "req-test".into(),
                "http",
            )
            .await;
            serde_json::to_value(&response).unwrap()
        }
    }

    fn default_source() -> MockSource {
        MockSource::with(&[("husky", 4), ("pug", 2), ("pointer", 1), ("samoyed", 3)])
    }

    #[tokio::test]
    async fn test_breeds_with_filters() {
        let harness = Harness::new(default_source());

        let res = harness
            .run(
                "{ breeds(fluffy: true) { edges { cursor favorited node { name fluffy } } breeds { name } } }",
                json!({}),
            )
            .await;

        let edges = res["data"]["breeds"]["edges"].as_array().unwrap();
        let names: Vec<_> = edges.iter().map(|e| e["node"]["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["husky", "samoyed"]);
        assert_eq!(edges[0]["cursor"], json!(Cursor::encode("husky").value));
        assert_eq!(edges[0]["favorited"], json!(false));
        assert_eq!(res["data"]["breeds"]["breeds"].as_array().unwrap().len(), 2);

        let res = harness.run("{ breeds(favorite: true) { breeds { name } } }", json!({})).await;
        assert_eq!(res["data"]["breeds"]["breeds"], json!([{ "name": "pointer" }]));
    }

    #[tokio::test]
    async fn test_breed_by_id() {
        let harness = Harness::new(default_source());
        let query = "query($id: ID!) { breedById(id: $id) { id name fluffy favorite } }";

        let res = harness
            .run(query, json!({ "id": to_global_id("Breed", "husky") }))
            .await;
        assert_eq!(
            res["data"]["breedById"],
            json!({
                "id": to_global_id("Breed", "husky"),
                "name": "husky",
                "fluffy": true,
                "favorite": false
            })
        );

        // Race inconnue => null, pas d'erreur
        let res = harness
            .run(query, json!({ "id": to_global_id("Breed", "unicorn") }))
            .await;
        assert_eq!(res["data"]["breedById"], Value::Null);
        assert!(res.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_breed_by_id_requires_id() {
        let harness = Harness::new(default_source());

        let res = harness.run(r#"{ breedById(id: "") { name } }"#, json!({})).await;
        assert_eq!(
            res["errors"][0]["message"],
            json!("breedById requires an ID to be provided")
        );
        assert_eq!(res["errors"][0]["extensions"]["code"], json!("INVALID_ARGUMENT"));
    }

    #[tokio::test]
    async fn test_photos_forward_pagination() {
        let harness = Harness::new(default_source());
        let query = r#"query($id: ID!, $after: ID) {
            breedById(id: $id) {
                photos(first: 2, after: $after) {
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                    edges { cursor node { url title } }
                    images { url }
                }
            }
        }"#;

        let res = harness
            .run(query, json!({ "id": to_global_id("Breed", "husky"), "after": null }))
            .await;
        let photos = &res["data"]["breedById"]["photos"];
        assert_eq!(photos["edges"].as_array().unwrap().len(), 2);
        assert_eq!(photos["images"].as_array().unwrap().len(), 2);
        assert_eq!(photos["edges"][0]["node"]["title"], json!("Photo of husky"));
        assert_eq!(
            photos["edges"][0]["cursor"],
            json!(Cursor::encode("https://images.test/husky/0.jpg").value)
        );
        // Sans curseur, les drapeaux restent à false
        assert_eq!(photos["pageInfo"]["hasNextPage"], json!(false));
        assert_eq!(photos["pageInfo"]["hasPreviousPage"], json!(false));

        // Page suivante à partir de endCursor
        let end_cursor = photos["pageInfo"]["endCursor"].clone();
        let res = harness
            .run(query, json!({ "id": to_global_id("Breed", "husky"), "after": end_cursor }))
            .await;
        let photos = &res["data"]["breedById"]["photos"];
        let urls: Vec<_> = photos["images"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["url"].as_str().unwrap())
            .collect();
        assert_eq!(urls, ["https://images.test/husky/2.jpg", "https://images.test/husky/3.jpg"]);
        assert_eq!(photos["pageInfo"]["hasPreviousPage"], json!(true));
    }

    #[tokio::test]
    async fn test_photos_reject_both_directions() {
        let harness = Harness::new(default_source());

        let res = harness
            .run(
                "query($id: ID!) { breedById(id: $id) { name photos(first: 1, last: 1) { images { url } } } }",
                json!({ "id": to_global_id("Breed", "pug") }),
            )
            .await;

        assert!(res["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains("Cannot page both forward and backward"));
        assert_eq!(res["errors"][0]["extensions"]["code"], json!("INVALID_ARGUMENT"));
        // Validation avant tout chargement des photos
        assert_eq!(res["data"]["breedById"]["name"], json!("pug"));
        assert_eq!(res["data"]["breedById"]["photos"], Value::Null);
    }

    // Test critique: une seule requête amont par race et par portée
    #[tokio::test]
    async fn test_images_fetched_once_per_request() {
        let harness = Harness::new(default_source());

        harness
            .run(
                "query($id: ID!) { breedById(id: $id) { name a: photos(first: 1) { images { url } } b: photos(last: 2) { images { url } } } }",
                json!({ "id": to_global_id("Breed", "husky") }),
            )
            .await;
        assert_eq!(harness.source.image_calls.load(Ordering::SeqCst), 1);

        harness
            .run("{ breeds { breeds { photos(first: 1) { images { url } } } } }", json!({}))
            .await;
        assert_eq!(harness.source.image_calls.load(Ordering::SeqCst), 5);
        assert_eq!(harness.source.list_calls.load(Ordering::SeqCst), 1);
    }

    // Chaque requête a sa propre portée de cache
    #[tokio::test]
    async fn test_scope_is_not_shared_between_requests() {
        let harness = Harness::new(default_source());

        harness.run("{ breeds { breeds { name } } }", json!({})).await;
        harness.run("{ breeds { breeds { name } } }", json!({})).await;

        assert_eq!(harness.source.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_node_resolves_breeds() {
        let harness = Harness::new(default_source());
        let query = "query($id: ID!) { node(id: $id) { id ... on Breed { name } } }";

        let res = harness
            .run(query, json!({ "id": to_global_id("Breed", "pug") }))
            .await;
        assert_eq!(res["data"]["node"]["name"], json!("pug"));

        let res = harness
            .run(query, json!({ "id": to_global_id("Image", "pug") }))
            .await;
        assert_eq!(res["data"]["node"], Value::Null);
    }

    #[tokio::test]
    async fn test_save_favorite_success() {
        let harness = Harness::new(default_source());

        let res = harness
            .run(
                r#"mutation($input: ViewerSaveFavoriteBreedInput!) {
                    viewerSaveFavoriteBreed(input: $input) {
                        __typename
                        ... on ViewerSaveFavoriteBreedSuccess {
                            clientMutationId
                            breed { name favorite }
                            favorites { breeds { name } }
                        }
                    }
                }"#,
                json!({ "input": { "clientMutationId": "m1", "breedId": to_global_id("Breed", "pug") } }),
            )
            .await;

        let payload = &res["data"]["viewerSaveFavoriteBreed"];
        assert_eq!(payload["__typename"], json!("ViewerSaveFavoriteBreedSuccess"));
        assert_eq!(payload["clientMutationId"], json!("m1"));
        assert_eq!(payload["breed"], json!({ "name": "pug", "favorite": true }));
        assert_eq!(
            payload["favorites"]["breeds"],
            json!([{ "name": "pug" }, { "name": "pointer" }])
        );

        // Persiste au-delà de la requête
        let res = harness.run("{ breeds(favorite: true) { breeds { name } } }", json!({})).await;
        assert_eq!(res["data"]["breeds"]["breeds"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_favorite_unknown_breed_returns_error_payload() {
        let harness = Harness::new(default_source());

        let res = harness
            .run(
                r#"mutation($input: ViewerSaveFavoriteBreedInput!) {
                    viewerSaveFavoriteBreed(input: $input) {
                        __typename
                        ... on ViewerSaveFavoriteBreedError {
                            clientMutationId
                            error { code message friendlyMessage }
                        }
                    }
                }"#,
                json!({ "input": { "breedId": to_global_id("Breed", "unicorn") } }),
            )
            .await;

        assert!(res.get("errors").is_none());
        let payload = &res["data"]["viewerSaveFavoriteBreed"];
        assert_eq!(payload["__typename"], json!("ViewerSaveFavoriteBreedError"));
        assert_eq!(payload["clientMutationId"], Value::Null);
        assert_eq!(payload["error"]["code"], json!("ERR_BREED_NOT_FOUND"));
        assert_eq!(payload["error"]["message"], json!("Breed not found"));
        assert_eq!(
            payload["error"]["friendlyMessage"],
            json!("I couldn't find that breed. Please check your ID and try again")
        );
    }

    // Les clients peuvent cibler les interfaces génériques de mutation
    #[tokio::test]
    async fn test_mutation_payloads_through_interfaces() {
        let harness = Harness::new(default_source());
        let query = r#"mutation($input: ViewerSaveFavoriteBreedInput!) {
            viewerSaveFavoriteBreed(input: $input) {
                ... on MutationSuccess { clientMutationId }
                ... on MutationError { clientMutationId error { code } }
            }
        }"#;

        let res = harness
            .run(
                query,
                json!({ "input": { "clientMutationId": "ok", "breedId": to_global_id("Breed", "pug") } }),
            )
            .await;
        assert_eq!(
            res["data"]["viewerSaveFavoriteBreed"],
            json!({ "clientMutationId": "ok" })
        );

        let res = harness
            .run(
                query,
                json!({ "input": { "clientMutationId": "ko", "breedId": to_global_id("Breed", "unicorn") } }),
            )
            .await;
        assert_eq!(
            res["data"]["viewerSaveFavoriteBreed"],
            json!({ "clientMutationId": "ko", "error": { "code": "ERR_BREED_NOT_FOUND" } })
        );
    }

    #[test]
    fn test_mutation_interfaces_in_sdl() {
        let sdl = build_schema().sdl();
        assert!(sdl.contains("interface MutationError"));
        assert!(sdl.contains("interface MutationSuccess"));
        assert!(sdl.contains("type ViewerSaveFavoriteBreedError implements MutationError"));
        assert!(sdl.contains("type ViewerSaveFavoriteBreedSuccess implements MutationSuccess"));
    }

    // Une panne amont n'est pas une erreur métier: erreur GraphQL sans payload
    #[tokio::test]
    async fn test_save_favorite_upstream_failure_is_graphql_error() {
        let harness = Harness::new(MockSource {
            fail_images: true,
            ..default_source()
        });

        let res = harness
            .run(
                r#"mutation($input: ViewerSaveFavoriteBreedInput!) {
                    viewerSaveFavoriteBreed(input: $input) { __typename }
                }"#,
                json!({ "input": { "breedId": to_global_id("Breed", "pug") } }),
            )
            .await;

        assert!(res["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains("connection reset"));
        assert!(res["errors"][0]["extensions"].get("code").is_none());
    }

    #[test]
    fn test_breed_name_of_requires_breed_type() {
        assert_eq!(
            breed_name_of(&ID(to_global_id("Breed", "pug"))),
            Some("pug".to_string())
        );
        assert_eq!(breed_name_of(&ID(to_global_id("Image", "pug"))), None);
        assert_eq!(breed_name_of(&ID("pug".into())), None);
    }
}
