//! In-memory [`Database`] implementation.

use std::sync::Arc;

use common::operations::{By, Insert, Select};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{land, user, Land, User},
    infra::{database, Database},
};

/// In-memory [`Database`] keeping everything in process.
///
/// Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<State>>);

/// Contents of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`Land`]s, in insertion order.
    lands: Vec<Land>,

    /// Stored [`User`]s.
    users: Vec<User>,
}

impl Database<Insert<Land>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(land): Insert<Land>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        match state.lands.iter().position(|l| l.id == land.id) {
            Some(i) => state.lands[i] = land,
            None => state.lands.push(land),
        }
        Ok(())
    }
}

impl Database<Select<By<Vec<Land>, ()>>> for Memory {
    type Ok = Vec<Land>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Land>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.lands.clone())
    }
}

impl Database<Select<By<Option<Land>, land::Id>>> for Memory {
    type Ok = Option<Land>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Land>, land::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.0.read().await.lands.iter().find(|l| l.id == id).cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if !state.users.iter().any(|u| u.id == user.id) {
            state.users.push(user);
        }
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.0.read().await.users.iter().find(|u| u.id == id).copied())
    }
}
