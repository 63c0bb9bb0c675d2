//! Catalog reducer: browsing, lookup by slug, submission, suggestions,
//! and the bookmarked-resources sidebar.

use std::marker::PhantomData;

use optimal_core::effect::Effect;
use optimal_core::reducer::Reducer;
use optimal_core::{SmallVec, smallvec};

use crate::error::ResourceError;
use crate::providers::{BookmarkStore, IdentityProvider, ResourceCatalog};
use crate::slug::slug_title;
use crate::state::{NewResource, Resource, ResourceId, Suggestion};

/// State of the catalog pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogState {
    /// Resources of the last loaded tag page.
    pub resources: Vec<Resource>,

    /// Tag of the last loaded tag page.
    pub tag: Option<String>,

    /// Resource resolved from the last slug lookup.
    pub selected: Option<Resource>,

    /// The caller's bookmarked resources, most recently bookmarked first.
    pub bookmarked: Vec<Resource>,

    /// Whether a load is in flight.
    pub loading: bool,

    /// ID of the most recently accepted submission.
    pub submitted: Option<ResourceId>,

    /// The most recent failure.
    pub last_error: Option<ResourceError>,
}

/// Actions for the catalog pages.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    /// Load the approved resources filed under a tag.
    LoadByTag {
        /// Raw tag name as it appears in URLs ("javascript", "html-css").
        tag: String,
    },

    /// A tag page finished loading.
    TagLoaded {
        /// The tag that was loaded.
        tag: String,
        /// Approved resources under the tag, newest first.
        resources: Vec<Resource>,
    },

    /// Resolve a resource detail page from its title slug.
    LoadBySlug {
        /// Percent-encoded slug from the URL.
        slug: String,
    },

    /// A slug lookup resolved.
    ResourceLoaded {
        /// The matched resource.
        resource: Resource,
    },

    /// Submit a new resource for review.
    Submit {
        /// The form payload.
        submission: NewResource,
    },

    /// A submission was persisted (unapproved).
    Submitted {
        /// ID of the stored row.
        id: ResourceId,
    },

    /// File a site-improvement suggestion.
    Suggest {
        /// The suggestion payload.
        suggestion: Suggestion,
    },

    /// A suggestion was persisted.
    SuggestionSaved,

    /// Load the caller's bookmarked resources for the sidebar.
    LoadBookmarked,

    /// The bookmarked sidebar finished loading.
    BookmarkedLoaded {
        /// Bookmarked resources, most recently bookmarked first.
        resources: Vec<Resource>,
    },

    /// Any catalog operation failed.
    Failed {
        /// What went wrong.
        error: ResourceError,
    },
}

/// Dependencies of the catalog pages.
#[derive(Debug, Clone)]
pub struct CatalogEnvironment<C, B, I>
where
    C: ResourceCatalog + Clone,
    B: BookmarkStore + Clone,
    I: IdentityProvider + Clone,
{
    /// Catalog persistence.
    pub catalog: C,

    /// Bookmark persistence, for the sidebar join.
    pub bookmarks: B,

    /// Who is signed in.
    pub identity: I,
}

/// Reducer for the catalog pages.
#[derive(Debug, Clone)]
pub struct CatalogReducer<C, B, I> {
    _phantom: PhantomData<(C, B, I)>,
}

impl<C, B, I> CatalogReducer<C, B, I> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<C, B, I> Default for CatalogReducer<C, B, I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject malformed submissions before they reach the platform.
fn validate_submission(submission: &NewResource) -> Result<(), ResourceError> {
    if submission.title.trim().is_empty() {
        return Err(ResourceError::InvalidSubmission {
            reason: "title is required".to_string(),
        });
    }
    if submission.resource_url.trim().is_empty() {
        return Err(ResourceError::InvalidSubmission {
            reason: "resource URL is required".to_string(),
        });
    }
    if submission.tags.is_empty() {
        return Err(ResourceError::InvalidSubmission {
            reason: "at least one tag is required".to_string(),
        });
    }
    Ok(())
}

impl<C, B, I> Reducer for CatalogReducer<C, B, I>
where
    C: ResourceCatalog + Clone + 'static,
    B: BookmarkStore + Clone + 'static,
    I: IdentityProvider + Clone + 'static,
{
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment<C, B, I>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::LoadByTag { tag } => {
                state.loading = true;
                let catalog = env.catalog.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    match catalog.resources_by_tag(&tag).await {
                        Ok(resources) => Some(CatalogAction::TagLoaded { tag, resources }),
                        Err(error) => Some(CatalogAction::Failed { error }),
                    }
                }))]
            }

            CatalogAction::TagLoaded { tag, resources } => {
                state.tag = Some(tag);
                state.resources = resources;
                state.loading = false;
                smallvec![]
            }

            CatalogAction::LoadBySlug { slug } => {
                state.loading = true;
                let catalog = env.catalog.clone();
                // The slug is not an exact inverse of the title; recover a
                // lowercase pattern and let the catalog match substrings
                let pattern = slug_title(&slug);

                smallvec![Effect::Future(Box::pin(async move {
                    match catalog.resource_by_title(&pattern).await {
                        Ok(Some(resource)) => Some(CatalogAction::ResourceLoaded { resource }),
                        Ok(None) => Some(CatalogAction::Failed {
                            error: ResourceError::NotFound,
                        }),
                        Err(error) => Some(CatalogAction::Failed { error }),
                    }
                }))]
            }

            CatalogAction::ResourceLoaded { resource } => {
                state.selected = Some(resource);
                state.loading = false;
                smallvec![]
            }

            CatalogAction::Submit { submission } => {
                if env.identity.current_user().is_none() {
                    // Submission requires a session
                    return smallvec![];
                }
                if let Err(error) = validate_submission(&submission) {
                    state.last_error = Some(error);
                    return smallvec![];
                }
                let catalog = env.catalog.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    match catalog.submit_resource(submission).await {
                        Ok(resource) => Some(CatalogAction::Submitted { id: resource.id }),
                        Err(error) => Some(CatalogAction::Failed { error }),
                    }
                }))]
            }

            CatalogAction::Submitted { id } => {
                tracing::info!(?id, "resource submitted for review");
                state.submitted = Some(id);
                state.last_error = None;
                smallvec![]
            }

            CatalogAction::Suggest { suggestion } => {
                let catalog = env.catalog.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    match catalog.submit_suggestion(suggestion).await {
                        Ok(()) => Some(CatalogAction::SuggestionSaved),
                        Err(error) => Some(CatalogAction::Failed { error }),
                    }
                }))]
            }

            CatalogAction::SuggestionSaved => smallvec![],

            CatalogAction::LoadBookmarked => {
                let Some(user) = env.identity.current_user() else {
                    state.bookmarked.clear();
                    return smallvec![];
                };
                state.loading = true;
                let bookmarks = env.bookmarks.clone();
                let catalog = env.catalog.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    let ids = match bookmarks.bookmarked_resources(user).await {
                        Ok(ids) => ids,
                        Err(error) => return Some(CatalogAction::Failed { error }),
                    };
                    match catalog.resources_by_ids(&ids).await {
                        Ok(resources) => Some(CatalogAction::BookmarkedLoaded { resources }),
                        Err(error) => Some(CatalogAction::Failed { error }),
                    }
                }))]
            }

            CatalogAction::BookmarkedLoaded { resources } => {
                state.bookmarked = resources;
                state.loading = false;
                smallvec![]
            }

            CatalogAction::Failed { error } => {
                tracing::warn!(%error, "catalog operation failed");
                state.loading = false;
                state.last_error = Some(error);
                smallvec![]
            }
        }
    }
}
