use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait,
};

use newspaper_core::error::RepoError;

/// Row-level operations shared by the PostgreSQL repositories.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub async fn find_model<ID>(&self, id: ID) -> Result<Option<E::Model>, RepoError>
    where
        ID: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        E::find_by_id(id).one(&self.db).await.map_err(query_error)
    }

    /// Insert a new row or update an existing one.
    pub async fn persist(&self, model: E::ActiveModel, exists: bool) -> Result<E::Model, RepoError> {
        let result = if exists {
            model.update(&self.db).await
        } else {
            model.insert(&self.db).await
        };
        result.map_err(write_error)
    }

    pub async fn delete_by_id<ID>(&self, id: ID) -> Result<(), RepoError>
    where
        ID: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

pub(crate) fn query_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

pub(crate) fn write_error(err: DbErr) -> RepoError {
    let message = err.to_string();
    if message.contains("duplicate") || message.contains("unique") {
        RepoError::Constraint(message)
    } else {
        query_error(err)
    }
}
