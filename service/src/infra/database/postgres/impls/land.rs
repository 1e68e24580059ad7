//! [`Land`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use postgres_types::Json;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{land, Land, Polygon},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `lands` table, in the order [`from_row()`] expects them.
const COLUMNS: &str = "\
    id, name, description, image_url, price, \
    kind, availability_status, ownership_type, \
    coordinates, owner_id, created_at";

/// Builds a [`Land`] out of the provided `lands` table [`Row`].
fn from_row(row: &Row) -> Land {
    Land {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        price: row.get("price"),
        kind: row.get("kind"),
        availability_status: row.get("availability_status"),
        ownership_type: row.get("ownership_type"),
        coordinates: row.get::<_, Json<Polygon>>("coordinates").0,
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
    }
}

impl Database<Select<By<Vec<Land>, ()>>> for Postgres {
    type Ok = Vec<Land>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Land>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM lands \
             ORDER BY created_at, id",
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl Database<Select<By<Option<Land>, land::Id>>> for Postgres {
    type Ok = Option<Land>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Land>, land::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: land::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM lands \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl Database<Insert<Land>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(land): Insert<Land>,
    ) -> Result<Self::Ok, Self::Err> {
        let Land {
            id,
            name,
            description,
            image_url,
            price,
            kind,
            availability_status,
            ownership_type,
            coordinates,
            owner_id,
            created_at,
        } = land;

        const SQL: &str = "\
            INSERT INTO lands (\
                id, name, description, image_url, price, \
                kind, availability_status, ownership_type, \
                coordinates, owner_id, created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::TEXT, $4::VARCHAR, $5::NUMERIC, \
                $6::INT2, $7::INT2, $8::INT2, \
                $9::JSONB, $10::UUID, $11::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &description,
                &image_url,
                &price,
                &kind,
                &availability_status,
                &ownership_type,
                &Json(&coordinates),
                &owner_id,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
