use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_ipo_records::IpoRecords;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Code is not unique: the same listing may be recorded once per underwriter
        manager
            .create_index(
                Index::create()
                    .name("idx_ipo_records_code")
                    .table(IpoRecords::Table)
                    .col(IpoRecords::Code)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ipo_records_listing_date")
                    .table(IpoRecords::Table)
                    .col(IpoRecords::ListingDate)
                    .to_owned(),
            )
            .await?;

        // GIN index for underwriter containment lookups
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_ipo_records_underwriters ON ipo_records USING GIN (underwriters);",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP INDEX IF EXISTS idx_ipo_records_underwriters;")
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_ipo_records_listing_date")
                    .table(IpoRecords::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_ipo_records_code")
                    .table(IpoRecords::Table)
                    .to_owned(),
            )
            .await
    }
}
