use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use crate::models::{event, gallery_item, reef, reef_bookmark};

/// Delete a reef and everything hanging off it: gallery items linked to the
/// reef or to any of its events, bookmarks, events, then the reef row itself.
/// Runs in one transaction so a failure leaves the reef intact.
pub async fn delete_reef_cascade(db: &DatabaseConnection, reef_id: Uuid) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    let event_ids: Vec<Uuid> = event::Entity::find()
        .select_only()
        .column(event::Column::Id)
        .filter(event::Column::ReefId.eq(reef_id))
        .into_tuple()
        .all(&txn)
        .await?;

    if !event_ids.is_empty() {
        gallery_item::Entity::delete_many()
            .filter(gallery_item::Column::EventId.is_in(event_ids.clone()))
            .exec(&txn)
            .await?;
    }

    gallery_item::Entity::delete_many()
        .filter(gallery_item::Column::ReefId.eq(reef_id))
        .exec(&txn)
        .await?;

    reef_bookmark::Entity::delete_many()
        .filter(reef_bookmark::Column::ReefId.eq(reef_id))
        .exec(&txn)
        .await?;

    event::Entity::delete_many()
        .filter(event::Column::ReefId.eq(reef_id))
        .exec(&txn)
        .await?;

    reef::Entity::delete_by_id(reef_id).exec(&txn).await?;

    txn.commit().await
}

/// Delete an event and its gallery items in one transaction.
pub async fn delete_event_cascade(db: &DatabaseConnection, event_id: Uuid) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    gallery_item::Entity::delete_many()
        .filter(gallery_item::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;

    event::Entity::delete_by_id(event_id).exec(&txn).await?;

    txn.commit().await
}
