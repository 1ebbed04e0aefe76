use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Setting::Table)
                    .if_not_exists()
                    .col(pk_uuid(Setting::Id))
                    .col(string_uniq(Setting::Key))
                    .col(text(Setting::Value)) // string-encoded, parsed by the reader
                    .col(string_null(Setting::Description))
                    .col(string(Setting::Category).default("general"))
                    .col(timestamp_with_time_zone(Setting::CreatedAt))
                    .col(timestamp_with_time_zone(Setting::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activity::Table)
                    .if_not_exists()
                    .col(pk_uuid(Activity::Id))
                    .col(uuid_null(Activity::UserId))
                    .col(string(Activity::Action))
                    .col(string_null(Activity::Description))
                    .col(timestamp_with_time_zone(Activity::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activity-user")
                            .from(Activity::Table, Activity::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-activity-created-at")
                    .table(Activity::Table)
                    .col(Activity::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activity::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Setting::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Setting {
    Table,
    Id,
    Key,
    Value,
    Description,
    Category,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Activity {
    Table,
    Id,
    UserId,
    Action,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
