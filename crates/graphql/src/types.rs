//! GraphQL type definitions.

use async_graphql::{
    ComplexObject, Context, EmptySubscription, InputObject, Interface, Object, Result, Schema,
    SimpleObject, Union, ID,
};

use kennel_core::error::BreedError;
use kennel_core::models::{self, BreedFilter, PhotosKey};
use kennel_core::ports::{Connection, Cursor, Edge, Pagination};
use kennel_core::services::{paginate, validate_pagination};

use crate::context::RequestContext;
use crate::errors::{breed_error, pagination_error};
use crate::relay::to_global_id;
use crate::schema::{MutationRoot, QueryRoot};

/// The Kennel GraphQL schema type.
pub type KennelSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// GraphQL type name of breeds, used in global ids.
pub(crate) const BREED_TYPE: &str = "Breed";

// -----------------------------------------------------------------------------
// Node
// -----------------------------------------------------------------------------

/// Refetchable object.
#[derive(Interface)]
#[graphql(field(name = "id", ty = "ID"))]
pub enum Node {
    Breed(Breed),
}

// -----------------------------------------------------------------------------
// Breed
// -----------------------------------------------------------------------------

/// A dog breed.
pub struct Breed(pub(crate) models::Breed);

impl From<models::Breed> for Breed {
    fn from(breed: models::Breed) -> Self {
        Self(breed)
    }
}

#[Object]
impl Breed {
    /// Relay global id.
    async fn id(&self) -> ID {
        ID(to_global_id(BREED_TYPE, &self.0.id))
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn fluffy(&self) -> bool {
        self.0.fluffy
    }

    async fn favorite(&self) -> bool {
        self.0.favorite
    }

    /// Photos of this breed, cursor-paginated.
    ///
    /// `first` and `last` cannot be combined. Null if the breed has no
    /// photo listing upstream.
    async fn photos(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        last: Option<i32>,
        before: Option<ID>,
        after: Option<ID>,
    ) -> Result<Option<BreedPhotosConnection>> {
        let pagination = Pagination {
            first,
            after: after.map(|id| Cursor::new(id.0)),
            last,
            before: before.map(|id| Cursor::new(id.0)),
        };
        validate_pagination(&pagination).map_err(pagination_error)?;

        let scope = ctx.data::<RequestContext>()?;
        let images = scope
            .loaders
            .load_photos(PhotosKey::new(self.0.name.as_str()))
            .await
            .map_err(breed_error)?;

        let Some(images) = images else {
            return Ok(None);
        };

        let edges = images
            .into_iter()
            .map(|image| Edge::new(Cursor::encode(&image.url), image))
            .collect();

        let connection = paginate(edges, &pagination).map_err(pagination_error)?;
        Ok(Some(BreedPhotosConnection::from(connection)))
    }
}

// -----------------------------------------------------------------------------
// Photos connection
// -----------------------------------------------------------------------------

/// A photo of a breed.
#[derive(SimpleObject, Clone)]
pub struct Image {
    pub url: String,
    pub title: String,
}

impl From<models::Image> for Image {
    fn from(image: models::Image) -> Self {
        Self {
            url: image.url,
            title: image.title,
        }
    }
}

#[derive(SimpleObject)]
pub struct PageInfo {
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub start_cursor: Option<ID>,
    pub end_cursor: Option<ID>,
}

#[derive(SimpleObject)]
pub struct BreedPhotosEdge {
    pub cursor: ID,
    pub node: Image,
}

#[derive(SimpleObject)]
#[graphql(complex)]
pub struct BreedPhotosConnection {
    pub page_info: PageInfo,
    pub edges: Vec<BreedPhotosEdge>,
}

#[ComplexObject]
impl BreedPhotosConnection {
    /// Nodes of `edges`, without cursors.
    async fn images(&self) -> Vec<Image> {
        self.edges.iter().map(|edge| edge.node.clone()).collect()
    }
}

impl From<Connection<models::Image>> for BreedPhotosConnection {
    fn from(conn: Connection<models::Image>) -> Self {
        let page_info = PageInfo {
            has_previous_page: conn.page_info.has_previous_page,
            has_next_page: conn.page_info.has_next_page,
            start_cursor: conn.start_cursor().map(|c| ID(c.value.clone())),
            end_cursor: conn.end_cursor().map(|c| ID(c.value.clone())),
        };

        Self {
            page_info,
            edges: conn
                .edges
                .into_iter()
                .map(|e| BreedPhotosEdge {
                    cursor: ID(e.cursor.value),
                    node: Image::from(e.node),
                })
                .collect(),
        }
    }
}

// -----------------------------------------------------------------------------
// Viewer breeds connection
// -----------------------------------------------------------------------------

/// Breeds as seen by the viewer.
pub struct ViewerBreedsConnection {
    breeds: Vec<models::Breed>,
}

impl ViewerBreedsConnection {
    pub(crate) fn new(breeds: Vec<models::Breed>) -> Self {
        Self { breeds }
    }

    /// Load the breeds matching `filter` from the request scope.
    pub(crate) async fn load(ctx: &Context<'_>, filter: BreedFilter) -> Result<Self> {
        let scope = ctx.data::<RequestContext>()?;
        let breeds = scope.loaders.list(filter).await.map_err(breed_error)?;
        Ok(Self::new(breeds))
    }
}

#[Object]
impl ViewerBreedsConnection {
    async fn edges(&self) -> Vec<ViewerBreedsEdge> {
        self.breeds.iter().cloned().map(ViewerBreedsEdge).collect()
    }

    /// Nodes of `edges`, without the join data.
    async fn breeds(&self) -> Vec<Breed> {
        self.breeds.iter().cloned().map(Breed).collect()
    }
}

pub struct ViewerBreedsEdge(models::Breed);

#[Object]
impl ViewerBreedsEdge {
    async fn cursor(&self) -> ID {
        ID(Cursor::encode(&self.0.name).value)
    }

    async fn node(&self) -> Breed {
        Breed(self.0.clone())
    }

    /// Whether the viewer counts this breed as a favorite.
    async fn favorited(&self) -> bool {
        self.0.favorite
    }
}

// -----------------------------------------------------------------------------
// Mutation payloads
// -----------------------------------------------------------------------------

/// A user-facing error with a stable code.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "Error")]
pub struct ApiError {
    pub message: String,
    pub friendly_message: Option<String>,
    /// Never changes for a given cause; match on this, not on `message`.
    pub code: String,
}

impl ApiError {
    /// `None` for errors that are not meant to reach end users.
    pub(crate) fn from_breed_error(err: &BreedError) -> Option<Self> {
        let code = err.code()?;
        Some(Self {
            message: err.public_message().unwrap_or(code).to_owned(),
            friendly_message: err.friendly_message().map(str::to_owned),
            code: code.to_owned(),
        })
    }
}

#[derive(InputObject)]
pub struct ViewerSaveFavoriteBreedInput {
    pub client_mutation_id: Option<String>,
    pub breed_id: ID,
}

#[derive(Union)]
pub enum ViewerSaveFavoriteBreedPayload {
    Success(ViewerSaveFavoriteBreedSuccess),
    Error(ViewerSaveFavoriteBreedError),
}

pub struct ViewerSaveFavoriteBreedSuccess {
    pub(crate) client_mutation_id: Option<String>,
    pub(crate) breed_name: String,
}

#[Object]
impl ViewerSaveFavoriteBreedSuccess {
    async fn client_mutation_id(&self) -> Option<String> {
        self.client_mutation_id.clone()
    }

    /// The breed just saved.
    async fn breed(&self, ctx: &Context<'_>) -> Result<Breed> {
        let scope = ctx.data::<RequestContext>()?;
        scope
            .loaders
            .load(&self.breed_name)
            .await
            .map_err(breed_error)?
            .map(Breed)
            .ok_or_else(|| breed_error(BreedError::NotFound(self.breed_name.clone())))
    }

    /// The viewer's favorites after the save.
    async fn favorites(&self, ctx: &Context<'_>) -> Result<ViewerBreedsConnection> {
        ViewerBreedsConnection::load(ctx, BreedFilter::favorites()).await
    }
}

pub struct ViewerSaveFavoriteBreedError {
    pub(crate) client_mutation_id: Option<String>,
    pub(crate) error: ApiError,
}

#[Object]
impl ViewerSaveFavoriteBreedError {
    async fn client_mutation_id(&self) -> Option<String> {
        self.client_mutation_id.clone()
    }

    async fn error(&self) -> ApiError {
        self.error.clone()
    }
}

/// Failed outcome of any mutation.
#[derive(Interface)]
#[graphql(
    field(name = "client_mutation_id", ty = "Option<String>"),
    field(name = "error", ty = "ApiError")
)]
pub enum MutationError {
    ViewerSaveFavoriteBreed(ViewerSaveFavoriteBreedError),
}

/// Successful outcome of any mutation.
#[derive(Interface)]
#[graphql(field(name = "client_mutation_id", ty = "Option<String>"))]
pub enum MutationSuccess {
    ViewerSaveFavoriteBreed(ViewerSaveFavoriteBreedSuccess),
}
