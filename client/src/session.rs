//! [`Session`] tying the client components together.

use common::operations::{Allocate, By, Insert, Select};
use service::domain::{land, user, Land, Vertex};
use tracerr::Traced;
use tracing as log;

use crate::{
    geocode::{Lookup, Provider},
    infra::{ArcGis, FileStorage, HttpBackend, Storage},
    Backend, Candidate, Catalog, ClickTarget, Config, Draft, Error, Metadata,
    NewLand, Rejection, SearchBox, SearchProxy, View, Viewport,
};

/// Single browsing session of a user, driven by UI events.
///
/// All of its state is owned and mutated on a single event timeline.
#[derive(Debug)]
pub struct Session<B, P, S> {
    /// [`Backend`] persisting [`Land`]s.
    backend: B,

    /// Polygon being authored.
    draft: Draft,

    /// Known [`Land`]s.
    catalog: Catalog,

    /// Map [`Viewport`].
    viewport: Viewport<S>,

    /// Geocode search proxy.
    proxy: SearchProxy<P>,

    /// Shown search results.
    search: SearchBox,

    /// [`Land`] whose details are shown.
    selected: Option<land::Id>,
}

impl Session<HttpBackend, ArcGis, FileStorage> {
    /// Creates a new [`Session`] talking to the configured remote services
    /// and keeping its local state in the file at the provided `path`.
    ///
    /// # Errors
    ///
    /// If the HTTP clients cannot be initialized.
    pub fn connect(
        conf: &Config,
        path: impl Into<std::path::PathBuf>,
    ) -> Result<Self, Traced<Error>> {
        Ok(Self::new(
            HttpBackend::new(conf).map_err(tracerr::wrap!())?,
            ArcGis::new(conf).map_err(tracerr::wrap!())?,
            FileStorage::new(path),
            conf,
        ))
    }
}

impl<B, P, S: Storage> Session<B, P, S> {
    /// Creates a new [`Session`] on top of the provided collaborators.
    #[must_use]
    pub fn new(backend: B, provider: P, storage: S, conf: &Config) -> Self {
        Self {
            backend,
            draft: Draft::new(),
            catalog: Catalog::new(),
            viewport: Viewport::new(storage, conf.storage_key.clone()),
            proxy: SearchProxy::new(provider)
                .with_min_query_len(conf.geocode.min_query_len),
            search: SearchBox::new(),
            selected: None,
        }
    }

    /// Returns the [`Draft`] being authored.
    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Returns the [`Draft`] being authored, for dispatching UI events into.
    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Returns the known [`Land`]s.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the map [`Viewport`].
    #[must_use]
    pub fn viewport(&self) -> &Viewport<S> {
        &self.viewport
    }

    /// Returns the map [`Viewport`], for tracking zoom and layer changes.
    pub fn viewport_mut(&mut self) -> &mut Viewport<S> {
        &mut self.viewport
    }

    /// Returns the shown search results.
    #[must_use]
    pub fn search_results(&self) -> &[Candidate] {
        self.search.results()
    }

    /// Restores the saved [`View`] and loads the [`Catalog`].
    ///
    /// A failure to restore the [`View`] is only logged.
    ///
    /// # Errors
    ///
    /// If the [`Catalog`] cannot be loaded. It stays empty then.
    pub async fn start(&mut self) -> Result<(), Traced<Error>>
    where
        B: Backend<
            Select<By<Vec<Land>, ()>>,
            Ok = Vec<Land>,
            Err = Traced<Error>,
        >,
    {
        if let Err(e) = self.viewport.restore() {
            log::warn!("failed to restore saved view: {e}");
        }
        self.catalog
            .load_all(&self.backend)
            .await
            .map_err(tracerr::wrap!())
    }

    /// Dispatches a map click at the provided `point`.
    ///
    /// # Errors
    ///
    /// See [`Draft::add_vertex()`].
    pub fn click(
        &mut self,
        point: Vertex,
        target: ClickTarget,
    ) -> Result<(), Rejection> {
        self.draft.add_vertex(point, target)
    }

    /// Commits the [`Draft`] with the provided `metadata`.
    ///
    /// # Errors
    ///
    /// See [`Draft::commit()`].
    pub async fn commit(
        &mut self,
        metadata: Metadata,
    ) -> Result<Land, Traced<Error>>
    where
        B: Backend<Insert<NewLand>, Ok = Land, Err = Traced<Error>>,
    {
        self.draft
            .commit(metadata, &self.backend, &mut self.catalog)
            .await
            .map_err(tracerr::wrap!())
    }

    /// Searches for locations matching the provided `query`, showing the
    /// results unless a newer search has been started meanwhile.
    pub async fn search(&mut self, query: &str) -> &[Candidate]
    where
        P: Provider<Lookup, Ok = Vec<Candidate>, Err = Traced<Error>>,
    {
        if let Some(ticket) = self.search.begin(query) {
            let found = self.proxy.search(query).await;
            _ = self.search.complete(ticket, found);
        }
        self.search.results()
    }

    /// Picks the shown search result at the provided `index`, recentering the
    /// map on it.
    pub fn select_candidate(&mut self, index: usize) -> Option<&View> {
        let picked = self.search.select(index)?;
        Some(self.viewport.recenter(picked.location))
    }

    /// Shows details of the [`Land`] with the provided `id`.
    pub fn select_land(&mut self, id: land::Id) -> Option<&Land> {
        let land = self.catalog.get(id)?;
        self.selected = Some(id);
        Some(land)
    }

    /// Hides the shown [`Land`] details.
    pub fn deselect_land(&mut self) {
        self.selected = None;
    }

    /// Returns the [`Land`] whose details are shown.
    #[must_use]
    pub fn selected_land(&self) -> Option<&Land> {
        self.selected.and_then(|id| self.catalog.get(id))
    }

    /// Saves the current [`View`] as the preferred one.
    ///
    /// # Errors
    ///
    /// See [`Viewport::save_view()`].
    pub async fn save_view(&mut self) -> Result<user::Id, Traced<Error>>
    where
        B: Backend<Allocate<user::Id>, Ok = user::Id, Err = Traced<Error>>,
    {
        self.viewport
            .save_current_view(&self.backend)
            .await
            .map_err(tracerr::wrap!())
    }
}
