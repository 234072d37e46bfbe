use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250810_000001_create_reference_tables::Migration),
            Box::new(m20250810_000002_create_visit_tables::Migration),
        ]
    }
}

mod m20250810_000001_create_reference_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250810_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::FullName).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Phone).string().null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Companies::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Companies::Name).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Branches::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Branches::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Branches::CompanyId).big_integer().not_null())
                        .col(ColumnDef::new(Branches::Name).string().not_null())
                        .col(ColumnDef::new(Branches::Location).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_branches_company")
                                .from(Branches::Table, Branches::CompanyId)
                                .to(Companies::Table, Companies::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BranchRecipients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BranchRecipients::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(BranchRecipients::BranchId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BranchRecipients::Name).string().not_null())
                        .col(ColumnDef::new(BranchRecipients::Email).string().not_null())
                        .col(
                            ColumnDef::new(BranchRecipients::NotifyEmail)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recipients_branch")
                                .from(BranchRecipients::Table, BranchRecipients::BranchId)
                                .to(Branches::Table, Branches::Id),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BranchRecipients::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Branches::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
        FullName,
        Email,
        Phone,
        PasswordHash,
        Role,
        IsActive,
        CreatedAt,
    }

    #[derive(Iden)]
    enum Companies {
        Table,
        Id,
        Name,
    }

    #[derive(Iden)]
    enum Branches {
        Table,
        Id,
        CompanyId,
        Name,
        Location,
    }

    #[derive(Iden)]
    enum BranchRecipients {
        Table,
        Id,
        BranchId,
        Name,
        Email,
        NotifyEmail,
    }
}

mod m20250810_000002_create_visit_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250810_000002_create_visit_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Visits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Visits::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Visits::BranchId).big_integer().not_null())
                        .col(ColumnDef::new(Visits::EmployeeId).big_integer().not_null())
                        .col(ColumnDef::new(Visits::Status).string().not_null())
                        .col(
                            ColumnDef::new(Visits::StartedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Visits::EndedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Visits::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Visits::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visits_branch")
                                .from(Visits::Table, Visits::BranchId)
                                .to(Branches::Table, Branches::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VisitCash::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VisitCash::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(VisitCash::VisitId)
                                .big_integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(VisitCash::SystemBalance)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VisitCash::ActualBalance)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VisitCash::SalesAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VisitCash::RecordedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visit_cash_visit")
                                .from(VisitCash::Table, VisitCash::VisitId)
                                .to(Visits::Table, Visits::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VisitInventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VisitInventoryItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(VisitInventoryItems::VisitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VisitInventoryItems::ItemName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VisitInventoryItems::Color).string().null())
                        .col(ColumnDef::new(VisitInventoryItems::Size).string().null())
                        .col(
                            ColumnDef::new(VisitInventoryItems::SystemQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(VisitInventoryItems::ActualQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visit_inventory_visit")
                                .from(VisitInventoryItems::Table, VisitInventoryItems::VisitId)
                                .to(Visits::Table, Visits::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VisitNotes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VisitNotes::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(VisitNotes::VisitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VisitNotes::NoteText).text().not_null())
                        .col(
                            ColumnDef::new(VisitNotes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visit_notes_visit")
                                .from(VisitNotes::Table, VisitNotes::VisitId)
                                .to(Visits::Table, Visits::Id),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VisitNotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(VisitInventoryItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(VisitCash::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Visits::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum Branches {
        Table,
        Id,
    }

    #[derive(Iden)]
    enum Visits {
        Table,
        Id,
        BranchId,
        EmployeeId,
        Status,
        StartedAt,
        EndedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum VisitCash {
        Table,
        Id,
        VisitId,
        SystemBalance,
        ActualBalance,
        SalesAmount,
        RecordedAt,
    }

    #[derive(Iden)]
    enum VisitInventoryItems {
        Table,
        Id,
        VisitId,
        ItemName,
        Color,
        Size,
        SystemQty,
        ActualQty,
    }

    #[derive(Iden)]
    enum VisitNotes {
        Table,
        Id,
        VisitId,
        NoteText,
        CreatedAt,
    }
}
