use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create ipo_records table
        manager
            .create_table(
                Table::create()
                    .table(IpoRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IpoRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IpoRecords::Code).string_len(16).not_null())
                    .col(
                        ColumnDef::new(IpoRecords::CompanyName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IpoRecords::Underwriters)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    // Legacy single-underwriter column kept for old imports
                    .col(ColumnDef::new(IpoRecords::Uw).string_len(16).null())
                    .col(
                        ColumnDef::new(IpoRecords::IpoPrice)
                            .decimal_len(20, 4)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(IpoRecords::ListingBoard)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(IpoRecords::ListingDate).date().null())
                    .col(ColumnDef::new(IpoRecords::ReturnD1).double().null())
                    .col(ColumnDef::new(IpoRecords::ReturnD2).double().null())
                    .col(ColumnDef::new(IpoRecords::ReturnD3).double().null())
                    .col(ColumnDef::new(IpoRecords::ReturnD4).double().null())
                    .col(ColumnDef::new(IpoRecords::ReturnD5).double().null())
                    .col(ColumnDef::new(IpoRecords::ReturnD6).double().null())
                    .col(ColumnDef::new(IpoRecords::ReturnD7).double().null())
                    .col(ColumnDef::new(IpoRecords::Record).text().null())
                    .col(
                        ColumnDef::new(IpoRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(IpoRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Keep updated_at current on every write
        let db = manager.get_connection();
        db.execute_unprepared(
            r#"
            CREATE OR REPLACE FUNCTION update_ipo_records_updated_at()
            RETURNS TRIGGER AS $$
            BEGIN
                NEW.updated_at = NOW();
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql;
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            DROP TRIGGER IF EXISTS trigger_ipo_records_updated_at ON ipo_records;
            CREATE TRIGGER trigger_ipo_records_updated_at
                BEFORE UPDATE ON ipo_records
                FOR EACH ROW
                EXECUTE FUNCTION update_ipo_records_updated_at();
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TRIGGER IF EXISTS trigger_ipo_records_updated_at ON ipo_records;")
            .await?;
        db.execute_unprepared("DROP FUNCTION IF EXISTS update_ipo_records_updated_at();")
            .await?;

        manager
            .drop_table(Table::drop().table(IpoRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum IpoRecords {
    Table,
    Id,
    Code,
    CompanyName,
    Underwriters,
    Uw,
    IpoPrice,
    ListingBoard,
    ListingDate,
    ReturnD1,
    ReturnD2,
    ReturnD3,
    ReturnD4,
    ReturnD5,
    ReturnD6,
    ReturnD7,
    Record,
    CreatedAt,
    UpdatedAt,
}
