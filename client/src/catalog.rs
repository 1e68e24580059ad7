//! Client-held [`Catalog`] of known [`Land`]s.

use std::collections::HashSet;

use common::operations::{By, Select};
use derive_more::{Display, Error};
use service::domain::{land, Land};
use tracerr::Traced;
use tracing as log;

use crate::{Backend, Error as ClientError};

/// Collection of [`Land`]s known to the client, in render order.
///
/// IDs of the held [`Land`]s are unique.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    /// Held [`Land`]s.
    lands: Vec<Land>,

    /// IDs of the held [`Land`]s.
    ids: HashSet<land::Id>,
}

impl Catalog {
    /// Creates a new empty [`Catalog`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the held [`Land`]s, in render order.
    #[must_use]
    pub fn lands(&self) -> &[Land] {
        &self.lands
    }

    /// Returns the held [`Land`] with the provided `id`, if any.
    #[must_use]
    pub fn get(&self, id: land::Id) -> Option<&Land> {
        self.lands.iter().find(|l| l.id == id)
    }

    /// Returns the number of held [`Land`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lands.len()
    }

    /// Indicates whether this [`Catalog`] holds no [`Land`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lands.is_empty()
    }

    /// Replaces the held [`Land`]s with the full list of the `backend`.
    ///
    /// On failure, the held [`Land`]s stay as they were. Repeated IDs in the
    /// list are skipped.
    ///
    /// # Errors
    ///
    /// Whatever the `backend` fails with.
    pub async fn load_all<B>(
        &mut self,
        backend: &B,
    ) -> Result<(), Traced<ClientError>>
    where
        B: Backend<
            Select<By<Vec<Land>, ()>>,
            Ok = Vec<Land>,
            Err = Traced<ClientError>,
        >,
    {
        let fetched = backend
            .execute(Select(By::new(())))
            .await
            .inspect_err(|e| log::error!("failed to fetch `Land`s: {e}"))
            .map_err(tracerr::wrap!())?;

        let mut loaded = Self::new();
        for land in fetched {
            if let Err(e) = loaded.append(land) {
                log::warn!("skipping fetched `Land`: {e}");
            }
        }
        log::debug!("loaded {} `Land`s", loaded.len());
        *self = loaded;

        Ok(())
    }

    /// Appends a confirmed [`Land`] to the end of this [`Catalog`].
    ///
    /// # Errors
    ///
    /// If a [`Land`] with the same ID is already held.
    pub fn append(&mut self, land: Land) -> Result<&Land, Duplicate> {
        if !self.ids.insert(land.id) {
            return Err(Duplicate(land.id));
        }
        self.lands.push(land);
        Ok(&self.lands[self.lands.len() - 1])
    }
}

/// Error of appending a [`Land`] already held by a [`Catalog`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("`Land(id: {_0})` is already in the catalog")]
pub struct Duplicate(#[error(not(source))] pub land::Id);

#[cfg(test)]
mod spec {
    use std::cell::RefCell;

    use common::{
        operations::{By, Select},
        DateTime, Handler,
    };
    use service::domain::{land, Land, Polygon, Vertex};
    use tracerr::Traced;

    use crate::Error;

    use super::{Catalog, Duplicate};

    fn land(name: &str) -> Land {
        Land {
            id: land::Id::new(),
            name: land::Name::new(name).unwrap(),
            description: None,
            image_url: None,
            price: None,
            kind: land::Kind::Commercial,
            availability_status: None,
            ownership_type: None,
            coordinates: Polygon::new(vec![
                Vertex::new(1.0, 1.0).unwrap(),
                Vertex::new(2.0, 2.0).unwrap(),
                Vertex::new(3.0, 3.0).unwrap(),
            ])
            .unwrap(),
            owner_id: None,
            created_at: DateTime::now().coerce(),
        }
    }

    /// Backend serving a fixed list, or failing once it's exhausted.
    struct Backend(RefCell<Vec<Result<Vec<Land>, String>>>);

    impl Handler<Select<By<Vec<Land>, ()>>> for Backend {
        type Ok = Vec<Land>;
        type Err = Traced<Error>;

        async fn execute(
            &self,
            _: Select<By<Vec<Land>, ()>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0
                .borrow_mut()
                .remove(0)
                .map_err(|e| tracerr::new!(Error::Transient(e)))
        }
    }

    #[test]
    fn appends_to_the_end() {
        let (a, b) = (land("A"), land("B"));
        let mut catalog = Catalog::new();

        _ = catalog.append(a.clone()).unwrap();
        _ = catalog.append(b.clone()).unwrap();

        assert_eq!(catalog.lands(), [a.clone(), b].as_slice());
        assert_eq!(catalog.get(a.id), Some(&a));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let a = land("A");
        let mut catalog = Catalog::new();
        _ = catalog.append(a.clone()).unwrap();

        assert_eq!(catalog.append(a.clone()), Err(Duplicate(a.id)));
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn load_replaces_held_lands() {
        let (a, b) = (land("A"), land("B"));
        let backend =
            Backend(RefCell::new(vec![Ok(vec![a.clone(), b.clone()])]));
        let mut catalog = Catalog::new();
        _ = catalog.append(land("Stale")).unwrap();

        catalog.load_all(&backend).await.unwrap();

        assert_eq!(catalog.lands(), [a, b].as_slice());
    }

    #[tokio::test]
    async fn failed_load_keeps_held_lands() {
        let a = land("A");
        let backend = Backend(RefCell::new(vec![
            Ok(vec![a.clone()]),
            Err("timed out".into()),
        ]));
        let mut catalog = Catalog::new();
        catalog.load_all(&backend).await.unwrap();

        let err = catalog.load_all(&backend).await.unwrap_err();

        assert!(err.as_ref().is_transient());
        assert_eq!(catalog.lands(), [a].as_slice());
    }

    #[tokio::test]
    async fn load_skips_repeated_ids() {
        let a = land("A");
        let backend =
            Backend(RefCell::new(vec![Ok(vec![a.clone(), a.clone()])]));
        let mut catalog = Catalog::new();

        catalog.load_all(&backend).await.unwrap();

        assert_eq!(catalog.lands(), [a].as_slice());
    }
}
