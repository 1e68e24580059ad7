//! [`Command`] for creating a new [`Land`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::land::{
    Availability, Description, ImageUrl, Kind, Name, Ownership, Price,
};
use crate::{
    domain::{land, user, Land, Polygon, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Land`].
#[derive(Clone, Debug)]
pub struct CreateLand {
    /// [`Name`] of a new [`Land`].
    pub name: land::Name,

    /// [`Description`] of a new [`Land`].
    pub description: Option<land::Description>,

    /// [`ImageUrl`] of a new [`Land`].
    pub image_url: Option<land::ImageUrl>,

    /// [`Price`] of a new [`Land`].
    pub price: Option<land::Price>,

    /// [`Kind`] of a new [`Land`].
    pub kind: land::Kind,

    /// [`Availability`] status of a new [`Land`].
    pub availability_status: Option<land::Availability>,

    /// [`Ownership`] type of a new [`Land`].
    pub ownership_type: Option<land::Ownership>,

    /// Outline of a new [`Land`].
    pub coordinates: Polygon,

    /// ID of the [`User`] a new [`Land`] is attributed to.
    pub owner_id: Option<user::Id>,
}

impl<Db> Command<CreateLand> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Land>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Land;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateLand) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateLand {
            name,
            description,
            image_url,
            price,
            kind,
            availability_status,
            ownership_type,
            coordinates,
            owner_id,
        } = cmd;

        if let Some(owner_id) = owner_id {
            let owner = self
                .database()
                .execute(Select(By::new(owner_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if owner.is_none() {
                return Err(tracerr::new!(E::OwnerNotExists(owner_id)));
            }
        }

        let land = Land {
            id: land::Id::new(),
            name,
            description,
            image_url,
            price,
            kind,
            availability_status,
            ownership_type,
            coordinates,
            owner_id,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(land.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::debug!(
            "created `Land(id: {}, vertices: {})`",
            land.id,
            land.coordinates.len(),
        );

        Ok(land)
    }
}

/// Error of [`CreateLand`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] referenced as the owner doesn't exist.
    #[display("`User(id: {_0})` doesn't exist")]
    OwnerNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{Command as _, CreateLand, CreateUser},
        domain::{land, user, Polygon, Vertex},
        infra::Memory,
        query,
        Service,
    };

    use super::ExecutionError;

    fn cmd(name: &str) -> CreateLand {
        CreateLand {
            name: land::Name::new(name).unwrap(),
            description: None,
            image_url: None,
            price: None,
            kind: land::Kind::Farming,
            availability_status: Some(land::Availability::ForRent),
            ownership_type: Some(land::Ownership::Private),
            coordinates: Polygon::new(vec![
                Vertex::new(22.94, 89.18).unwrap(),
                Vertex::new(22.95, 89.19).unwrap(),
                Vertex::new(22.96, 89.2).unwrap(),
            ])
            .unwrap(),
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn assigns_id_and_persists() {
        let service = Service::new(Memory::default());

        let land = service.execute(cmd("Plot A")).await.unwrap();

        let stored = service
            .execute(query::land::ById::by(land.id))
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), Some(&land));
    }

    #[tokio::test]
    async fn lists_in_storage_order() {
        let service = Service::new(Memory::default());

        let first = service.execute(cmd("First")).await.unwrap();
        let second = service.execute(cmd("Second")).await.unwrap();

        let all = service.execute(query::lands::All::by(())).await.unwrap();
        let ids = all.iter().map(|l| l.id).collect::<Vec<_>>();
        assert_eq!(ids, [first.id, second.id]);
    }

    #[tokio::test]
    async fn references_existing_owner() {
        let service = Service::new(Memory::default());
        let owner = service.execute(CreateUser).await.unwrap();

        let land = service
            .execute(CreateLand {
                owner_id: Some(owner.id),
                ..cmd("Owned")
            })
            .await
            .unwrap();
        assert_eq!(land.owner_id, Some(owner.id));
    }

    #[tokio::test]
    async fn rejects_unknown_owner() {
        let service = Service::new(Memory::default());

        let err = service
            .execute(CreateLand {
                owner_id: Some(user::Id::new()),
                ..cmd("Orphan")
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::OwnerNotExists(_)));

        let all = service.execute(query::lands::All::by(())).await.unwrap();
        assert!(all.is_empty());
    }
}
