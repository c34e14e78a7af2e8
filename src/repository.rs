use async_trait::async_trait;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

use crate::{
    entities::movie,
    error::{StoreError, StoreResult},
    models::{Movie, MovieFields, MovieId},
};

pub const COLLECTION: &str = "movies";

/// The operations the HTTP layer needs from the movie collection.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Movie>>;

    /// Fails with [`StoreError::NotFound`] when nothing matches.
    async fn find_by_id(&self, id: MovieId) -> StoreResult<Movie>;

    async fn insert(&self, fields: MovieFields) -> StoreResult<MovieId>;

    /// Overwrites the content fields of the matching movie and returns how
    /// many documents matched. Zero is not an error.
    async fn replace_fields(&self, id: MovieId, fields: MovieFields) -> StoreResult<u64>;

    /// Returns how many documents were removed. Zero is not an error.
    async fn delete(&self, id: MovieId) -> StoreResult<u64>;
}

#[derive(Clone)]
pub struct DbMovieStore {
    db: DatabaseConnection,
}

impl DbMovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieStore for DbMovieStore {
    async fn find_all(&self) -> StoreResult<Vec<Movie>> {
        let rows = movie::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn find_by_id(&self, id: MovieId) -> StoreResult<Movie> {
        movie::Entity::find_by_id(id.get())
            .one(&self.db)
            .await?
            .map(Movie::from)
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, fields: MovieFields) -> StoreResult<MovieId> {
        let model = movie::ActiveModel {
            id: NotSet,
            name: Set(fields.name),
            cover_image: Set(fields.cover_image),
            description: Set(fields.description),
        };

        let res = movie::Entity::insert(model).exec(&self.db).await?;
        MovieId::new(res.last_insert_id).ok_or_else(|| {
            StoreError::Db(sea_orm::DbErr::Custom(format!(
                "database assigned a non-positive id {}",
                res.last_insert_id
            )))
        })
    }

    async fn replace_fields(&self, id: MovieId, fields: MovieFields) -> StoreResult<u64> {
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Name, Expr::value(fields.name))
            .col_expr(movie::Column::CoverImage, Expr::value(fields.cover_image))
            .col_expr(movie::Column::Description, Expr::value(fields.description))
            .filter(movie::Column::Id.eq(id.get()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }

    async fn delete(&self, id: MovieId) -> StoreResult<u64> {
        let res = movie::Entity::delete_by_id(id.get()).exec(&self.db).await?;
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> DbMovieStore {
        DbMovieStore::new(crate::db::connect_memory().await.unwrap())
    }

    fn dune() -> MovieFields {
        MovieFields {
            name: "Dune".into(),
            cover_image: "dune.jpg".into(),
            description: "Sci-fi epic".into(),
        }
    }

    #[tokio::test]
    async fn empty_collection_lists_nothing() {
        let store = store().await;
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_assigns_id_and_round_trips() {
        let store = store().await;
        let id = store.insert(dune()).await.unwrap();

        let found = store.find_by_id(id).await.unwrap();
        assert_eq!(found, Movie::with_id(id, dune()));

        let other = store.insert(dune()).await.unwrap();
        assert_ne!(id, other);
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = store().await;
        let err = store.find_by_id(MovieId::new(404).unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn replace_fields_keeps_id() {
        let store = store().await;
        let id = store.insert(dune()).await.unwrap();

        let renamed = MovieFields { name: "Dune (2021)".into(), ..dune() };
        assert_eq!(store.replace_fields(id, renamed.clone()).await.unwrap(), 1);
        assert_eq!(store.find_by_id(id).await.unwrap(), Movie::with_id(id, renamed));
    }

    #[tokio::test]
    async fn replace_fields_on_missing_id_matches_nothing() {
        let store = store().await;
        let missing = MovieId::new(9).unwrap();
        assert_eq!(store.replace_fields(missing, dune()).await.unwrap(), 0);
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_count() {
        let store = store().await;
        let id = store.insert(dune()).await.unwrap();

        assert_eq!(store.delete(id).await.unwrap(), 1);
        assert_eq!(store.delete(id).await.unwrap(), 0);
        assert!(matches!(store.find_by_id(id).await, Err(StoreError::NotFound)));
    }
}
