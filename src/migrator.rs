// The MigrationTrait methods take `&SchemaManager` with a late-bound lifetime;
// writing the elided `<'_>` form would make it early-bound and fail E0195, so the
// elided-lifetime idiom lint (denied crate-wide) is allowed for this module.
#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_identity_tables::Migration),
            Box::new(m20240301_000002_create_catalog_tables::Migration),
            Box::new(m20240301_000003_create_cash_tables::Migration),
            Box::new(m20240301_000004_create_sales_tables::Migration),
            Box::new(m20240301_000005_create_inventory_history_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_identity_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_identity_tables"
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
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::Username).string().not_null())
                        .col(ColumnDef::new(Users::Password).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Unique username makes walk-in sentinel bootstrap idempotent
            manager
                .create_index(
                    Index::create()
                        .name("idx_users_username")
                        .table(Users::Table)
                        .col(Users::Username)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Clients::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Clients::Name).string().not_null())
                        .col(ColumnDef::new(Clients::DocumentType).string().null())
                        .col(ColumnDef::new(Clients::DocumentNumber).string().null())
                        .col(ColumnDef::new(Clients::Status).string().not_null())
                        .col(ColumnDef::new(Clients::UserId).integer().null())
                        .col(ColumnDef::new(Clients::OrganizationId).integer().null())
                        .col(ColumnDef::new(Clients::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Clients::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_clients_name")
                        .table(Clients::Table)
                        .col(Clients::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Email,
        Username,
        Password,
        Role,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Clients {
        Table,
        Id,
        Name,
        DocumentType,
        DocumentNumber,
        Status,
        UserId,
        OrganizationId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Stores::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Stores::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Stores::Name).string().not_null())
                        .col(ColumnDef::new(Stores::OrganizationId).integer().null())
                        .col(ColumnDef::new(Stores::CompanyId).integer().null())
                        .col(ColumnDef::new(Stores::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Stores::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::OrganizationId).integer().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Inventories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inventories::ProductId).integer().not_null())
                        .col(ColumnDef::new(Inventories::OrganizationId).integer().null())
                        .col(ColumnDef::new(Inventories::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Inventories::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventories_product")
                        .table(Inventories::Table)
                        .col(Inventories::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StoreInventories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StoreInventories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StoreInventories::StoreId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreInventories::InventoryId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreInventories::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StoreInventories::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreInventories::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_store_inventories_store_inventory")
                        .table(StoreInventories::Table)
                        .col(StoreInventories::StoreId)
                        .col(StoreInventories::InventoryId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Entries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Entries::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Entries::StoreId).integer().not_null())
                        .col(ColumnDef::new(Entries::OrganizationId).integer().null())
                        .col(ColumnDef::new(Entries::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EntryDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EntryDetails::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(EntryDetails::EntryId).integer().not_null())
                        .col(ColumnDef::new(EntryDetails::ProductId).integer().not_null())
                        .col(
                            ColumnDef::new(EntryDetails::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EntryDetails::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EntryDetails::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_entry_details_product")
                        .table(EntryDetails::Table)
                        .col(EntryDetails::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SerialUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SerialUnits::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SerialUnits::EntryDetailId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SerialUnits::Serial).string().not_null())
                        .col(ColumnDef::new(SerialUnits::Status).string().not_null())
                        .col(ColumnDef::new(SerialUnits::OrganizationId).integer().null())
                        .col(
                            ColumnDef::new(SerialUnits::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SerialUnits::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_serial_units_entry_detail_serial")
                        .table(SerialUnits::Table)
                        .col(SerialUnits::EntryDetailId)
                        .col(SerialUnits::Serial)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_serial_units_serial")
                        .table(SerialUnits::Table)
                        .col(SerialUnits::Serial)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SerialUnits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EntryDetails::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Entries::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StoreInventories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Inventories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Stores::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Stores {
        Table,
        Id,
        Name,
        OrganizationId,
        CompanyId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Price,
        OrganizationId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Inventories {
        Table,
        Id,
        ProductId,
        OrganizationId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StoreInventories {
        Table,
        Id,
        StoreId,
        InventoryId,
        Stock,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Entries {
        Table,
        Id,
        StoreId,
        OrganizationId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum EntryDetails {
        Table,
        Id,
        EntryId,
        ProductId,
        Quantity,
        Price,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum SerialUnits {
        Table,
        Id,
        EntryDetailId,
        Serial,
        Status,
        OrganizationId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_cash_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_cash_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaymentMethods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentMethods::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PaymentMethods::Name).string().not_null())
                        .col(
                            ColumnDef::new(PaymentMethods::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(PaymentMethods::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentMethods::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Unique name: concurrent sentinel bootstrap must converge on one row
            manager
                .create_index(
                    Index::create()
                        .name("idx_payment_methods_name")
                        .table(PaymentMethods::Table)
                        .col(PaymentMethods::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CashRegisters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashRegisters::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CashRegisters::StoreId).integer().not_null())
                        .col(ColumnDef::new(CashRegisters::Name).string().not_null())
                        .col(
                            ColumnDef::new(CashRegisters::InitialBalance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashRegisters::CurrentBalance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(CashRegisters::Status).string().not_null())
                        .col(
                            ColumnDef::new(CashRegisters::OrganizationId)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CashRegisters::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CashRegisters::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_cash_registers_store_status")
                        .table(CashRegisters::Table)
                        .col(CashRegisters::StoreId)
                        .col(CashRegisters::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CashTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashTransactions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CashTransactions::CashRegisterId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashTransactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashTransactions::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashTransactions::Description)
                                .text()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CashTransactions::UserId).integer().not_null())
                        .col(ColumnDef::new(CashTransactions::ClientName).string().null())
                        .col(
                            ColumnDef::new(CashTransactions::ClientDocument)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CashTransactions::ClientDocumentType)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CashTransactions::OrganizationId)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CashTransactions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_cash_transactions_register")
                        .table(CashTransactions::Table)
                        .col(CashTransactions::CashRegisterId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CashTransactionPaymentMethods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashTransactionPaymentMethods::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CashTransactionPaymentMethods::CashTransactionId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashTransactionPaymentMethods::PaymentMethodId)
                                .integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_ct_payment_methods_transaction")
                        .table(CashTransactionPaymentMethods::Table)
                        .col(CashTransactionPaymentMethods::CashTransactionId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(CashTransactionPaymentMethods::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(CashTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CashRegisters::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PaymentMethods {
        Table,
        Id,
        Name,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CashRegisters {
        Table,
        Id,
        StoreId,
        Name,
        InitialBalance,
        CurrentBalance,
        Status,
        OrganizationId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CashTransactions {
        Table,
        Id,
        CashRegisterId,
        TransactionType,
        Amount,
        Description,
        UserId,
        ClientName,
        ClientDocument,
        ClientDocumentType,
        OrganizationId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum CashTransactionPaymentMethods {
        Table,
        Id,
        CashTransactionId,
        PaymentMethodId,
    }
}

mod m20240301_000004_create_sales_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_sales_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sales::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Sales::UserId).integer().not_null())
                        .col(ColumnDef::new(Sales::StoreId).integer().not_null())
                        .col(ColumnDef::new(Sales::ClientId).integer().not_null())
                        .col(ColumnDef::new(Sales::Total).decimal().not_null().default(0))
                        .col(ColumnDef::new(Sales::Description).text().null())
                        .col(ColumnDef::new(Sales::Source).string().not_null())
                        .col(ColumnDef::new(Sales::OrganizationId).integer().null())
                        .col(ColumnDef::new(Sales::CompanyId).integer().null())
                        .col(ColumnDef::new(Sales::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_created_at")
                        .table(Sales::Table)
                        .col(Sales::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_organization")
                        .table(Sales::Table)
                        .col(Sales::OrganizationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SaleLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SaleLines::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SaleLines::SaleId).integer().not_null())
                        .col(ColumnDef::new(SaleLines::ProductId).integer().not_null())
                        .col(
                            ColumnDef::new(SaleLines::StoreInventoryId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SaleLines::EntryDetailId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleLines::Quantity).integer().not_null())
                        .col(ColumnDef::new(SaleLines::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(SaleLines::Series).json().not_null())
                        .col(ColumnDef::new(SaleLines::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sale_lines_sale")
                        .table(SaleLines::Table)
                        .col(SaleLines::SaleId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SalePayments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalePayments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SalePayments::SaleId).integer().not_null())
                        .col(
                            ColumnDef::new(SalePayments::PaymentMethodId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalePayments::Amount).decimal().not_null())
                        .col(ColumnDef::new(SalePayments::Currency).string().not_null())
                        .col(ColumnDef::new(SalePayments::TransactionId).string().null())
                        .col(
                            ColumnDef::new(SalePayments::CashTransactionId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalePayments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sale_payments_sale")
                        .table(SalePayments::Table)
                        .col(SalePayments::SaleId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Invoices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Invoices::SaleId).integer().not_null())
                        .col(ColumnDef::new(Invoices::Serie).string().not_null())
                        .col(ColumnDef::new(Invoices::Correlative).string().not_null())
                        .col(ColumnDef::new(Invoices::DocumentType).string().not_null())
                        .col(ColumnDef::new(Invoices::Currency).string().not_null())
                        .col(ColumnDef::new(Invoices::Total).decimal().not_null())
                        .col(ColumnDef::new(Invoices::IssuedAt).timestamp().not_null())
                        .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Invoices::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Correlative assignment reads the latest invoice per document type
            manager
                .create_index(
                    Index::create()
                        .name("idx_invoices_document_type_correlative")
                        .table(Invoices::Table)
                        .col(Invoices::DocumentType)
                        .col(Invoices::Correlative)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_invoices_sale")
                        .table(Invoices::Table)
                        .col(Invoices::SaleId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SalePayments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SaleLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Sales {
        Table,
        Id,
        UserId,
        StoreId,
        ClientId,
        Total,
        Description,
        Source,
        OrganizationId,
        CompanyId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum SaleLines {
        Table,
        Id,
        SaleId,
        ProductId,
        StoreInventoryId,
        EntryDetailId,
        Quantity,
        UnitPrice,
        Series,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum SalePayments {
        Table,
        Id,
        SaleId,
        PaymentMethodId,
        Amount,
        Currency,
        TransactionId,
        CashTransactionId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        SaleId,
        Serie,
        Correlative,
        DocumentType,
        Currency,
        Total,
        IssuedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000005_create_inventory_history_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_inventory_history_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryHistories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryHistories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryHistories::InventoryId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryHistories::UserId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryHistories::Action).string().not_null())
                        .col(
                            ColumnDef::new(InventoryHistories::Description)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryHistories::StockChange)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryHistories::PreviousStock)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryHistories::NewStock)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryHistories::OrganizationId)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryHistories::CompanyId)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryHistories::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_histories_inventory")
                        .table(InventoryHistories::Table)
                        .col(InventoryHistories::InventoryId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryHistories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryHistories {
        Table,
        Id,
        InventoryId,
        UserId,
        Action,
        Description,
        StockChange,
        PreviousStock,
        NewStock,
        OrganizationId,
        CompanyId,
        CreatedAt,
    }
}
