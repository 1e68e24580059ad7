//! [`Command`] for allocating a new anonymous [`User`].

use common::{operations::Insert, DateTime};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for allocating a new anonymous [`User`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CreateUser;

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: CreateUser) -> Result<Self::Ok, Self::Err> {
        let user = User {
            id: user::Id::new(),
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(user))
            .await
            .map_err(tracerr::wrap!())?;

        log::debug!("allocated `User(id: {})`", user.id);

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use crate::{
        command::{Command as _, CreateUser},
        infra::Memory,
        query,
        Service,
    };

    #[tokio::test]
    async fn allocates_distinct_users() {
        let service = Service::new(Memory::default());

        let first = service.execute(CreateUser).await.unwrap();
        let second = service.execute(CreateUser).await.unwrap();
        assert_ne!(first.id, second.id);

        let stored = service
            .execute(query::user::ById::by(first.id))
            .await
            .unwrap();
        assert_eq!(stored, Some(first));
    }
}
