//! Polygon [`Draft`] authored out of map clicks.

use common::operations::Insert;
use derive_more::{Display, Error};
use service::domain::{Land, Polygon, Vertex};
use tracerr::Traced;
use tracing as log;

use crate::{
    submission::{Metadata, NewLand},
    Backend, Catalog, Error as ClientError,
};

/// Authoring mode of a [`Draft`].
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum Mode {
    /// No draft is in progress.
    #[default]
    Idle,

    /// Vertices are being collected out of map clicks.
    Authoring,

    /// Enough vertices are collected and the metadata form is open.
    AwaitingMetadata,
}

/// Origin of a map click.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClickTarget {
    /// Bare base map surface.
    BaseMap,

    /// Polygon or another shape already rendered on top of the base map.
    Overlay,
}

/// Reason of a [`Draft`] transition being refused.
///
/// A refused transition never changes the [`Draft`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum Rejection {
    /// Authoring is already in progress.
    #[display("authoring is already in progress")]
    AlreadyAuthoring,

    /// No authoring is in progress.
    #[display("no authoring is in progress")]
    NotAuthoring,

    /// Click originated from an overlay rather than the base map.
    #[display("click doesn't target the base map")]
    Overlay,

    /// Metadata form is open, so vertices are frozen.
    #[display("vertices are frozen while awaiting metadata")]
    AwaitingMetadata,

    /// There is no vertex to revert.
    #[display("draft has no vertices")]
    Empty,

    /// Too few vertices to form a [`Polygon`].
    #[display("polygon requires at least 3 vertices, got {_0}")]
    TooFewVertices(#[error(not(source))] usize),

    /// Commit wasn't requested.
    #[display("commit wasn't requested")]
    NotAwaitingMetadata,
}

/// In-progress, uncommitted polygon.
///
/// Its vertices are always empty in [`Mode::Idle`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Draft {
    /// Current [`Mode`].
    mode: Mode,

    /// Collected vertices, in authoring order.
    vertices: Vec<Vertex>,
}

impl Draft {
    /// Creates a new [`Mode::Idle`] [`Draft`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current [`Mode`] of this [`Draft`].
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the collected vertices, in authoring order.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Indicates whether [`Draft::revert_last()`] would be accepted.
    #[must_use]
    pub fn can_revert(&self) -> bool {
        self.mode == Mode::Authoring && !self.vertices.is_empty()
    }

    /// Indicates whether [`Draft::request_commit()`] would be accepted.
    #[must_use]
    pub fn can_request_commit(&self) -> bool {
        self.mode == Mode::Authoring
            && self.vertices.len() >= Polygon::MIN_VERTICES
    }

    /// Starts authoring a new polygon from scratch.
    ///
    /// # Errors
    ///
    /// With [`Rejection::AlreadyAuthoring`] if this [`Draft`] isn't
    /// [`Mode::Idle`]. Nothing changes then.
    pub fn start_authoring(&mut self) -> Result<(), Rejection> {
        if self.mode != Mode::Idle {
            return Err(Rejection::AlreadyAuthoring);
        }
        self.vertices.clear();
        self.mode = Mode::Authoring;
        log::debug!("started authoring");
        Ok(())
    }

    /// Appends the clicked `vertex`, if the click landed on the base map.
    ///
    /// # Errors
    ///
    /// - [`Rejection::NotAuthoring`] in [`Mode::Idle`];
    /// - [`Rejection::AwaitingMetadata`] while the metadata form is open;
    /// - [`Rejection::Overlay`] for clicks on overlays.
    pub fn add_vertex(
        &mut self,
        vertex: Vertex,
        target: ClickTarget,
    ) -> Result<(), Rejection> {
        match self.mode {
            Mode::Idle => return Err(Rejection::NotAuthoring),
            Mode::AwaitingMetadata => return Err(Rejection::AwaitingMetadata),
            Mode::Authoring => {}
        }
        if target == ClickTarget::Overlay {
            return Err(Rejection::Overlay);
        }
        self.vertices.push(vertex);
        Ok(())
    }

    /// Removes the last collected vertex and returns it.
    ///
    /// # Errors
    ///
    /// - [`Rejection::NotAuthoring`] in [`Mode::Idle`];
    /// - [`Rejection::AwaitingMetadata`] while the metadata form is open;
    /// - [`Rejection::Empty`] if there is nothing to remove.
    pub fn revert_last(&mut self) -> Result<Vertex, Rejection> {
        match self.mode {
            Mode::Idle => Err(Rejection::NotAuthoring),
            Mode::AwaitingMetadata => Err(Rejection::AwaitingMetadata),
            Mode::Authoring => self.vertices.pop().ok_or(Rejection::Empty),
        }
    }

    /// Discards all the collected vertices and returns to [`Mode::Idle`].
    ///
    /// # Errors
    ///
    /// With [`Rejection::NotAuthoring`] if already [`Mode::Idle`].
    pub fn cancel(&mut self) -> Result<(), Rejection> {
        if self.mode == Mode::Idle {
            return Err(Rejection::NotAuthoring);
        }
        self.reset();
        log::debug!("authoring cancelled");
        Ok(())
    }

    /// Freezes the collected vertices and opens the metadata form.
    ///
    /// # Errors
    ///
    /// - [`Rejection::NotAuthoring`] in [`Mode::Idle`];
    /// - [`Rejection::AwaitingMetadata`] if already requested;
    /// - [`Rejection::TooFewVertices`] if fewer than
    ///   [`Polygon::MIN_VERTICES`] are collected.
    pub fn request_commit(&mut self) -> Result<(), Rejection> {
        match self.mode {
            Mode::Idle => return Err(Rejection::NotAuthoring),
            Mode::AwaitingMetadata => return Err(Rejection::AwaitingMetadata),
            Mode::Authoring => {}
        }
        if self.vertices.len() < Polygon::MIN_VERTICES {
            return Err(Rejection::TooFewVertices(self.vertices.len()));
        }
        self.mode = Mode::AwaitingMetadata;
        Ok(())
    }

    /// Closes the metadata form without saving, keeping the vertices.
    ///
    /// # Errors
    ///
    /// With [`Rejection::NotAwaitingMetadata`] if the form isn't open.
    pub fn dismiss_metadata(&mut self) -> Result<(), Rejection> {
        if self.mode != Mode::AwaitingMetadata {
            return Err(Rejection::NotAwaitingMetadata);
        }
        self.mode = Mode::Authoring;
        Ok(())
    }

    /// Combines the collected vertices with the provided `metadata` into a
    /// [`NewLand`].
    ///
    /// # Errors
    ///
    /// With [`Rejection::NotAwaitingMetadata`] if commit wasn't requested.
    pub fn submission(&self, metadata: Metadata) -> Result<NewLand, Rejection> {
        if self.mode != Mode::AwaitingMetadata {
            return Err(Rejection::NotAwaitingMetadata);
        }
        let coordinates = Polygon::new(self.vertices.clone())
            .map_err(|e| Rejection::TooFewVertices(e.0))?;
        Ok(NewLand {
            metadata,
            coordinates,
        })
    }

    /// Submits this [`Draft`] with the provided `metadata` to the `backend`.
    ///
    /// On success, this [`Draft`] is reset to [`Mode::Idle`] and the
    /// confirmed [`Land`] is appended to the `catalog`, unless the `catalog`
    /// holds it already. On failure, this [`Draft`] is left untouched, so the
    /// commit may be retried.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Rejected`] if commit wasn't requested;
    /// - whatever the `backend` fails with.
    pub async fn commit<B>(
        &mut self,
        metadata: Metadata,
        backend: &B,
        catalog: &mut Catalog,
    ) -> Result<Land, Traced<ClientError>>
    where
        B: Backend<Insert<NewLand>, Ok = Land, Err = Traced<ClientError>>,
    {
        let new = self
            .submission(metadata)
            .map_err(tracerr::from_and_wrap!(=> ClientError))?;

        let land = backend
            .execute(Insert(new))
            .await
            .inspect_err(|e| log::warn!("failed to save `Land`: {e}"))
            .map_err(tracerr::wrap!())?;

        // Already persisted, so the draft is done with either way.
        self.reset();
        if let Err(e) = catalog.append(land.clone()) {
            log::warn!("not appending committed `Land`: {e}");
        }

        log::debug!("committed `Land(id: {})`", land.id);

        Ok(land)
    }

    /// Resets this [`Draft`] to an empty [`Mode::Idle`] one.
    fn reset(&mut self) {
        self.vertices.clear();
        self.mode = Mode::Idle;
    }
}
