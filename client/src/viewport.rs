//! Map [`Viewport`] and its persistence.

use common::operations::Allocate;
use serde::Deserialize;
use serde_json::{Map, Value};
use service::domain::{user, Vertex};
use tracerr::Traced;
use tracing as log;

use crate::{
    infra::{storage, Storage},
    Backend, Error,
};

/// Default key of the [`Viewport`] state blob in a [`Storage`].
pub const DEFAULT_STORAGE_KEY: &str = "landVistaData";

/// Zoom level of a map, clamped to the tile layer limits.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Zoom(u8);

impl Zoom {
    /// Farthest supported [`Zoom`] level.
    pub const MIN: Self = Self(3);

    /// Closest supported [`Zoom`] level.
    pub const MAX: Self = Self(19);

    /// Default [`Zoom`] level.
    pub const DEFAULT: Self = Self(18);

    /// Creates a new [`Zoom`] out of the provided `level`, clamping it into
    /// [`Zoom::MIN`]..=[`Zoom::MAX`].
    #[must_use]
    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// Creates a new [`Zoom`] out of the provided fractional `level`,
    /// rounding and clamping it.
    ///
    /// [`None`] is returned if the `level` isn't finite.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "clamped into `u8` range beforehand"
    )]
    fn from_fractional(level: f64) -> Option<Self> {
        level
            .is_finite()
            .then(|| Self::new(level.round().clamp(0.0, 255.0) as u8))
    }

    /// Returns the level of this [`Zoom`].
    #[must_use]
    pub const fn level(self) -> u8 {
        self.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Map view: its center, zoom and base layer.
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    /// Center of the map.
    pub center: Vertex,

    /// [`Zoom`] of the map.
    pub zoom: Zoom,

    /// Identifier of the active base tile layer.
    pub base_layer: String,
}

impl View {
    /// Latitude and longitude of the default map center.
    pub const DEFAULT_CENTER: (f64, f64) =
        (22.942_757_374_388_29, 89.184_025_163_920_86);

    /// Default base tile layer.
    pub const DEFAULT_BASE_LAYER: &'static str = "World_Imagery";
}

impl Default for View {
    fn default() -> Self {
        let (lat, lng) = Self::DEFAULT_CENTER;
        Self {
            center: Vertex::new(lat, lng).expect("infallible"),
            zoom: Zoom::DEFAULT,
            base_layer: Self::DEFAULT_BASE_LAYER.to_owned(),
        }
    }
}

/// Stored map center, either as a `[lat, lng]` pair or as a `{lat, lng}`
/// object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Center {
    /// `[lat, lng]` pair.
    Pair(Vertex),

    /// `{lat, lng}` object.
    Object {
        /// Latitude.
        lat: f64,

        /// Longitude.
        lng: f64,
    },
}

/// State blob persisted in a [`Storage`].
///
/// Keys it doesn't know about are kept as is. Known keys holding values of
/// unexpected shape are treated as absent.
#[derive(Debug, Default)]
struct Saved {
    /// ID of the [`User`] of this browser.
    ///
    /// [`User`]: service::domain::User
    user_id: Option<user::Id>,

    /// Saved map center.
    map_center: Option<Vertex>,

    /// Saved zoom.
    map_zoom: Option<Zoom>,

    /// Saved base layer.
    active_base_layer: Option<String>,

    /// All the stored entries, known ones included.
    entries: Map<String, Value>,
}

impl Saved {
    /// Key of the [`User`] ID.
    ///
    /// [`User`]: service::domain::User
    const USER_ID: &'static str = "user_id";

    /// Key of the map center.
    const MAP_CENTER: &'static str = "map_center";

    /// Key of the zoom level.
    const MAP_ZOOM: &'static str = "map_zoom";

    /// Key of the base layer.
    const BASE_LAYER: &'static str = "activeBaseLayer";

    /// Parses the known keys out of the provided stored `entries`.
    fn parse(entries: Map<String, Value>) -> Self {
        let user_id = Self::field(&entries, Self::USER_ID, |v| {
            v.as_str().and_then(|s| s.parse().ok())
        });
        let map_center = Self::field(&entries, Self::MAP_CENTER, |v| {
            match Center::deserialize(v).ok()? {
                Center::Pair(center) => Some(center),
                Center::Object { lat, lng } => Vertex::new(lat, lng).ok(),
            }
        });
        let map_zoom = Self::field(&entries, Self::MAP_ZOOM, |v| {
            v.as_f64().and_then(Zoom::from_fractional)
        });
        let active_base_layer = Self::field(&entries, Self::BASE_LAYER, |v| {
            v.as_str().filter(|s| !s.is_empty()).map(ToOwned::to_owned)
        });
        Self {
            user_id,
            map_center,
            map_zoom,
            active_base_layer,
            entries,
        }
    }

    /// Reads the value under the provided `key` of the `entries` with the
    /// provided `parse` function, warning about a malformed one.
    fn field<T>(
        entries: &Map<String, Value>,
        key: &str,
        parse: impl FnOnce(&Value) -> Option<T>,
    ) -> Option<T> {
        let value = entries.get(key).filter(|v| !v.is_null())?;
        let parsed = parse(value);
        if parsed.is_none() {
            log::warn!("ignoring malformed `{key}` entry: {value}");
        }
        parsed
    }

    /// Stores the provided [`View`] for the provided [`User`] into the
    /// entries, keeping the other ones.
    ///
    /// [`User`]: service::domain::User
    fn into_entries(
        mut self,
        user_id: user::Id,
        view: &View,
    ) -> Map<String, Value> {
        let center = Value::from(vec![view.center.lat(), view.center.lng()]);
        for (key, value) in [
            (Self::USER_ID, Value::from(user_id.to_string())),
            (Self::MAP_CENTER, center),
            (Self::MAP_ZOOM, Value::from(view.zoom.level())),
            (Self::BASE_LAYER, Value::from(view.base_layer.clone())),
        ] {
            _ = self.entries.insert(key.to_owned(), value);
        }
        self.entries
    }
}

/// Controller of the map [`View`], saving and restoring it via a
/// [`Storage`].
#[derive(Clone, Debug)]
pub struct Viewport<S> {
    /// Current [`View`].
    view: View,

    /// [`Storage`] to persist the [`View`] into.
    storage: S,

    /// Key of the state blob in the [`Storage`].
    key: String,
}

impl<S: Storage> Viewport<S> {
    /// Creates a new [`Viewport`] showing the default [`View`], persisted
    /// under the provided `key` of the `storage`.
    #[must_use]
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            view: View::default(),
            storage,
            key: key.into(),
        }
    }

    /// Returns the current [`View`].
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Returns the underlying [`Storage`].
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Focuses the map on the provided `point`, keeping the [`Zoom`].
    pub fn recenter(&mut self, point: Vertex) -> &View {
        self.view.center = point;
        log::debug!("recentered to ({}, {})", point.lat(), point.lng());
        &self.view
    }

    /// Tracks a [`Zoom`] change made on the map.
    pub fn set_zoom(&mut self, zoom: Zoom) {
        self.view.zoom = zoom;
    }

    /// Tracks a base layer switch made on the map.
    pub fn set_base_layer(&mut self, layer: impl Into<String>) {
        self.view.base_layer = layer.into();
    }

    /// Returns the [`User`] ID persisted in the [`Storage`], if any.
    ///
    /// # Errors
    ///
    /// If the [`Storage`] cannot be read.
    ///
    /// [`User`]: service::domain::User
    pub fn user_id(&self) -> Result<Option<user::Id>, Traced<Error>> {
        Ok(self.load().map_err(tracerr::wrap!())?.user_id)
    }

    /// Applies the [`View`] saved in the [`Storage`], if any.
    ///
    /// Returns whether anything was applied.
    ///
    /// # Errors
    ///
    /// If the [`Storage`] cannot be read.
    pub fn restore(&mut self) -> Result<bool, Traced<Error>> {
        let saved = self.load().map_err(tracerr::wrap!())?;

        let mut applied = false;
        if let Some(center) = saved.map_center {
            self.view.center = center;
            applied = true;
        }
        if let Some(zoom) = saved.map_zoom {
            self.view.zoom = zoom;
            applied = true;
        }
        if let Some(layer) = saved.active_base_layer {
            self.view.base_layer = layer;
            applied = true;
        }
        Ok(applied)
    }

    /// Persists the provided [`View`] along with the [`User`] ID of this
    /// browser, allocating one via the `allocator` if there is none yet.
    ///
    /// Nothing is persisted if the allocation fails. Returns the [`User`] ID
    /// the [`View`] is saved for.
    ///
    /// # Errors
    ///
    /// - whatever the `allocator` fails with;
    /// - if the [`Storage`] cannot be read or written.
    ///
    /// [`User`]: service::domain::User
    pub async fn save_view<A>(
        &mut self,
        view: &View,
        allocator: &A,
    ) -> Result<user::Id, Traced<Error>>
    where
        A: Backend<Allocate<user::Id>, Ok = user::Id, Err = Traced<Error>>,
    {
        let saved = self.load().map_err(tracerr::wrap!())?;

        let user_id = match saved.user_id {
            Some(id) => id,
            None => allocator
                .execute(Allocate::new())
                .await
                .inspect_err(|e| {
                    log::warn!("failed to allocate `User` ID: {e}");
                })
                .map_err(tracerr::wrap!())?,
        };

        let entries = saved.into_entries(user_id, view);
        let blob = serde_json::to_string(&entries).map_err(|e| {
            tracerr::new!(Error::Storage(storage::Error::Json(e)))
        })?;
        self.storage
            .set(&self.key, blob)
            .map_err(tracerr::map_from_and_wrap!(=> Error))?;

        log::debug!("saved view for `User(id: {user_id})`");

        Ok(user_id)
    }

    /// Saves the current [`View`].
    ///
    /// # Errors
    ///
    /// See [`Viewport::save_view()`].
    pub async fn save_current_view<A>(
        &mut self,
        allocator: &A,
    ) -> Result<user::Id, Traced<Error>>
    where
        A: Backend<Allocate<user::Id>, Ok = user::Id, Err = Traced<Error>>,
    {
        let view = self.view.clone();
        self.save_view(&view, allocator).await
    }

    /// Loads the state blob from the [`Storage`].
    ///
    /// A blob that isn't a JSON object is treated as an absent one.
    fn load(&self) -> Result<Saved, Traced<Error>> {
        let Some(raw) = self
            .storage
            .get(&self.key)
            .map_err(tracerr::map_from_and_wrap!(=> Error))?
        else {
            return Ok(Saved::default());
        };
        let entries = serde_json::from_str::<Map<String, Value>>(&raw)
            .unwrap_or_else(|e| {
                log::warn!("ignoring malformed `{}` state: {e}", self.key);
                Map::new()
            });
        Ok(Saved::parse(entries))
    }
}

#[cfg(test)]
mod spec {
    use std::cell::Cell;

    use common::{operations::Allocate, Handler};
    use serde_json::json;
    use service::domain::{user, Vertex};
    use tracerr::Traced;

    use crate::{
        infra::{MemoryStorage, Storage as _},
        Error,
    };

    use super::{View, Viewport, Zoom, DEFAULT_STORAGE_KEY as KEY};

    /// Allocator handing out a fixed ID, or failing while `fail` is set.
    #[derive(Default)]
    struct Allocator {
        id: user::Id,
        fail: bool,
        calls: Cell<usize>,
    }

    impl Handler<Allocate<user::Id>> for Allocator {
        type Ok = user::Id;
        type Err = Traced<Error>;

        async fn execute(
            &self,
            _: Allocate<user::Id>,
        ) -> Result<Self::Ok, Self::Err> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(tracerr::new!(Error::Transient("offline".into())));
            }
            Ok(self.id)
        }
    }

    fn blob(viewport: &Viewport<MemoryStorage>) -> serde_json::Value {
        serde_json::from_str(&viewport.storage().get(KEY).unwrap().unwrap())
            .unwrap()
    }

    #[test]
    fn clamps_zoom() {
        assert_eq!(Zoom::new(0), Zoom::MIN);
        assert_eq!(Zoom::new(25), Zoom::MAX);
        assert_eq!(Zoom::new(12).level(), 12);
    }

    #[test]
    fn shows_default_view() {
        let viewport = Viewport::new(MemoryStorage::default(), KEY);
        let view = viewport.view();
        assert_eq!(view.center.lat(), 22.942_757_374_388_29);
        assert_eq!(view.center.lng(), 89.184_025_163_920_86);
        assert_eq!(view.zoom.level(), 18);
        assert_eq!(view.base_layer, "World_Imagery");
    }

    #[test]
    fn recenter_is_idempotent() {
        let mut viewport = Viewport::new(MemoryStorage::default(), KEY);
        let point = Vertex::new(22.5, 89.0).unwrap();

        let first = viewport.recenter(point).clone();
        let second = viewport.recenter(point).clone();

        assert_eq!(first, second);
        assert_eq!(second.center, point);
    }

    #[tokio::test]
    async fn allocates_user_once() {
        let allocator = Allocator::default();
        let mut viewport = Viewport::new(MemoryStorage::default(), KEY);

        let first = viewport.save_current_view(&allocator).await.unwrap();
        _ = viewport.recenter(Vertex::new(23.0, 90.0).unwrap());
        let second = viewport.save_current_view(&allocator).await.unwrap();

        assert_eq!(first, allocator.id);
        assert_eq!(second, allocator.id);
        assert_eq!(allocator.calls.get(), 1);
        assert_eq!(blob(&viewport)["map_center"], json!([23.0, 90.0]));
    }

    #[tokio::test]
    async fn failed_allocation_persists_nothing() {
        let allocator = Allocator {
            fail: true,
            ..Allocator::default()
        };
        let mut viewport = Viewport::new(MemoryStorage::default(), KEY);

        let err = viewport.save_current_view(&allocator).await.unwrap_err();

        assert!(err.as_ref().is_transient());
        assert_eq!(viewport.storage().get(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn preserves_unknown_keys() {
        let mut storage = MemoryStorage::default();
        storage
            .set(KEY, json!({ "theme": "dark", "map_zoom": 5 }).to_string())
            .unwrap();
        let mut viewport = Viewport::new(storage, KEY);

        let view = View {
            center: Vertex::new(22.5, 89.0).unwrap(),
            zoom: Zoom::new(15),
            base_layer: "World_Street_Map".into(),
        };
        let user_id = viewport
            .save_view(&view, &Allocator::default())
            .await
            .unwrap();

        assert_eq!(
            blob(&viewport),
            json!({
                "theme": "dark",
                "user_id": user_id,
                "map_center": [22.5, 89.0],
                "map_zoom": 15,
                "activeBaseLayer": "World_Street_Map",
            }),
        );
    }

    #[tokio::test]
    async fn restores_saved_view() {
        let mut saving = Viewport::new(MemoryStorage::default(), KEY);
        let view = View {
            center: Vertex::new(23.81, 90.41).unwrap(),
            zoom: Zoom::new(12),
            base_layer: "World_Topo_Map".into(),
        };
        _ = saving.save_view(&view, &Allocator::default()).await.unwrap();

        let mut restored = Viewport::new(saving.storage().clone(), KEY);
        assert!(restored.restore().unwrap());
        assert_eq!(restored.view(), &view);
        assert!(restored.user_id().unwrap().is_some());
    }

    #[tokio::test]
    async fn keeps_entries_around_malformed_fields() {
        let mut storage = MemoryStorage::default();
        storage
            .set(
                KEY,
                json!({
                    "theme": "dark",
                    "map_zoom": 17.5,
                    "map_center": "nowhere",
                })
                .to_string(),
            )
            .unwrap();
        let mut viewport = Viewport::new(storage, KEY);

        assert!(viewport.restore().unwrap());
        assert_eq!(viewport.view().zoom, Zoom::new(18));
        assert_eq!(viewport.view().center, View::default().center);

        let user_id = viewport
            .save_current_view(&Allocator::default())
            .await
            .unwrap();

        let saved = blob(&viewport);
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["user_id"], json!(user_id));
        assert_eq!(saved["map_zoom"], 18);
    }

    #[test]
    fn restores_legacy_center_object_and_large_zoom() {
        let mut storage = MemoryStorage::default();
        storage
            .set(
                KEY,
                json!({
                    "map_center": { "lat": 23.81, "lng": 90.41 },
                    "map_zoom": 300,
                })
                .to_string(),
            )
            .unwrap();
        let mut viewport = Viewport::new(storage, KEY);

        assert!(viewport.restore().unwrap());
        assert_eq!(viewport.view().center, Vertex::new(23.81, 90.41).unwrap());
        assert_eq!(viewport.view().zoom, Zoom::MAX);
    }

    #[tokio::test]
    async fn reallocates_only_unusable_user_id() {
        let mut storage = MemoryStorage::default();
        storage
            .set(KEY, json!({ "user_id": 42, "note": "kept" }).to_string())
            .unwrap();
        let mut viewport = Viewport::new(storage, KEY);
        let allocator = Allocator::default();

        let user_id = viewport.save_current_view(&allocator).await.unwrap();

        assert_eq!(user_id, allocator.id);
        assert_eq!(allocator.calls.get(), 1);
        assert_eq!(blob(&viewport)["note"], "kept");
    }

    #[test]
    fn ignores_malformed_state() {
        let mut storage = MemoryStorage::default();
        storage.set(KEY, "{oops".into()).unwrap();
        let mut viewport = Viewport::new(storage, KEY);

        assert!(!viewport.restore().unwrap());
        assert_eq!(viewport.view(), &View::default());
    }
}
