use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_vehicles_table::Migration),
            Box::new(m20250101_000002_create_rental_orders_table::Migration),
            Box::new(m20250101_000003_create_history_tables::Migration),
            Box::new(m20250101_000004_create_billing_tables::Migration),
            Box::new(m20250101_000005_create_promotions_table::Migration),
            Box::new(m20250101_000006_create_sequences_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_vehicles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_vehicles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vehicles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vehicles::PlateNumber).string().not_null())
                        .col(ColumnDef::new(Vehicles::ModelName).string().not_null())
                        .col(
                            ColumnDef::new(Vehicles::DailyRate)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Vehicles::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Vehicles::CurrentLocation).string())
                        .col(
                            ColumnDef::new(Vehicles::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Vehicles::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Vehicles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Vehicles::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_vehicles_plate_number")
                        .table(Vehicles::Table)
                        .col(Vehicles::PlateNumber)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Vehicles {
        Table,
        Id,
        PlateNumber,
        ModelName,
        DailyRate,
        Status,
        CurrentLocation,
        Version,
        IsDeleted,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_rental_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_rental_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RentalOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RentalOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RentalOrders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(RentalOrders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(RentalOrders::VehicleId).uuid().not_null())
                        .col(ColumnDef::new(RentalOrders::EmployeeId).uuid())
                        .col(ColumnDef::new(RentalOrders::StartDate).date().not_null())
                        .col(ColumnDef::new(RentalOrders::EndDate).date().not_null())
                        .col(
                            ColumnDef::new(RentalOrders::ActualStartDate)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::ActualEndDate)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::PickupLocation)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::ReturnLocation)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::DailyRate)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(RentalOrders::TotalDays).integer().not_null())
                        .col(
                            ColumnDef::new(RentalOrders::Subtotal)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::DiscountAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(RentalOrders::PromotionCode).string())
                        .col(
                            ColumnDef::new(RentalOrders::TotalAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::DepositAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(RentalOrders::Notes).string())
                        .col(
                            ColumnDef::new(RentalOrders::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalOrders::UpdatedAt).timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_rental_orders_order_number")
                        .table(RentalOrders::Table)
                        .col(RentalOrders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_rental_orders_vehicle_id")
                        .table(RentalOrders::Table)
                        .col(RentalOrders::VehicleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RentalOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum RentalOrders {
        Table,
        Id,
        OrderNumber,
        CustomerId,
        VehicleId,
        EmployeeId,
        StartDate,
        EndDate,
        ActualStartDate,
        ActualEndDate,
        PickupLocation,
        ReturnLocation,
        DailyRate,
        TotalDays,
        Subtotal,
        DiscountAmount,
        PromotionCode,
        TotalAmount,
        DepositAmount,
        Status,
        Notes,
        IsDeleted,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_history_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_history_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RentalStatusHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RentalStatusHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalStatusHistory::RentalOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RentalStatusHistory::OldStatus).string_len(32))
                        .col(
                            ColumnDef::new(RentalStatusHistory::NewStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalStatusHistory::ChangedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RentalStatusHistory::ChangedBy).uuid())
                        .col(ColumnDef::new(RentalStatusHistory::Notes).string())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_rental_status_history_order_id")
                        .table(RentalStatusHistory::Table)
                        .col(RentalStatusHistory::RentalOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VehicleHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VehicleHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VehicleHistory::VehicleId).uuid().not_null())
                        .col(
                            ColumnDef::new(VehicleHistory::Action)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(VehicleHistory::OldStatus).string_len(32))
                        .col(ColumnDef::new(VehicleHistory::NewStatus).string_len(32))
                        .col(ColumnDef::new(VehicleHistory::ReferenceType).string_len(32))
                        .col(ColumnDef::new(VehicleHistory::ReferenceId).uuid())
                        .col(ColumnDef::new(VehicleHistory::Description).string())
                        .col(ColumnDef::new(VehicleHistory::ChangedBy).uuid())
                        .col(
                            ColumnDef::new(VehicleHistory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_vehicle_history_vehicle_id")
                        .table(VehicleHistory::Table)
                        .col(VehicleHistory::VehicleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VehicleHistory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RentalStatusHistory::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum RentalStatusHistory {
        Table,
        Id,
        RentalOrderId,
        OldStatus,
        NewStatus,
        ChangedAt,
        ChangedBy,
        Notes,
    }

    #[derive(Iden)]
    pub enum VehicleHistory {
        Table,
        Id,
        VehicleId,
        Action,
        OldStatus,
        NewStatus,
        ReferenceType,
        ReferenceId,
        Description,
        ChangedBy,
        CreatedAt,
    }
}

mod m20250101_000004_create_billing_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_billing_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Invoices::InvoiceNumber).string().not_null())
                        .col(ColumnDef::new(Invoices::RentalOrderId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::InvoiceDate).date().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                        .col(
                            ColumnDef::new(Invoices::SubTotal)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::TaxRate)
                                .decimal_len(8, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::TaxAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::DiscountAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::TotalAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::PaidAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::RemainingAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Invoices::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Invoices::Notes).string())
                        .col(
                            ColumnDef::new(Invoices::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Invoices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Invoices::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_invoices_invoice_number")
                        .table(Invoices::Table)
                        .col(Invoices::InvoiceNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_invoices_rental_order_id")
                        .table(Invoices::Table)
                        .col(Invoices::RentalOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InvoiceLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoiceLines::InvoiceId).uuid().not_null())
                        .col(
                            ColumnDef::new(InvoiceLines::Description)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoiceLines::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(InvoiceLines::UnitPrice)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceLines::Amount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::PaymentNumber).string().not_null())
                        .col(ColumnDef::new(Payments::InvoiceId).uuid().not_null())
                        .col(
                            ColumnDef::new(Payments::Amount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::PaymentDate).date().not_null())
                        .col(ColumnDef::new(Payments::Method).string_len(32).not_null())
                        .col(ColumnDef::new(Payments::BankAccount).string())
                        .col(ColumnDef::new(Payments::TransactionCode).string())
                        .col(ColumnDef::new(Payments::Notes).string())
                        .col(
                            ColumnDef::new(Payments::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Payments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_payments_payment_number")
                        .table(Payments::Table)
                        .col(Payments::PaymentNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_payments_invoice_id")
                        .table(Payments::Table)
                        .col(Payments::InvoiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InvoiceLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Invoices {
        Table,
        Id,
        InvoiceNumber,
        RentalOrderId,
        CustomerId,
        InvoiceDate,
        DueDate,
        SubTotal,
        TaxRate,
        TaxAmount,
        DiscountAmount,
        TotalAmount,
        PaidAmount,
        RemainingAmount,
        Status,
        Notes,
        IsDeleted,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum InvoiceLines {
        Table,
        Id,
        InvoiceId,
        Description,
        Quantity,
        UnitPrice,
        Amount,
        CreatedAt,
    }

    #[derive(Iden)]
    pub enum Payments {
        Table,
        Id,
        PaymentNumber,
        InvoiceId,
        Amount,
        PaymentDate,
        Method,
        BankAccount,
        TransactionCode,
        Notes,
        IsDeleted,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000005_create_promotions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_promotions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Promotions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Promotions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Promotions::Code).string().not_null())
                        .col(ColumnDef::new(Promotions::Description).string())
                        .col(
                            ColumnDef::new(Promotions::PromotionType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Promotions::Value)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Promotions::MinAmount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Promotions::MaxDiscount).decimal_len(16, 2))
                        .col(
                            ColumnDef::new(Promotions::StartDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Promotions::EndDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Promotions::UsageLimit).integer())
                        .col(
                            ColumnDef::new(Promotions::UsedCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Promotions::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Promotions::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Promotions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Promotions::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_promotions_code")
                        .table(Promotions::Table)
                        .col(Promotions::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Promotions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Promotions {
        Table,
        Id,
        Code,
        Description,
        PromotionType,
        Value,
        MinAmount,
        MaxDiscount,
        StartDate,
        EndDate,
        UsageLimit,
        UsedCount,
        Status,
        IsDeleted,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000006_create_sequences_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sequences::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Sequences::Prefix).string_len(8).not_null())
                        .col(ColumnDef::new(Sequences::Day).date().not_null())
                        .col(ColumnDef::new(Sequences::Value).integer().not_null())
                        .primary_key(
                            Index::create()
                                .col(Sequences::Prefix)
                                .col(Sequences::Day),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sequences::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Sequences {
        Table,
        Prefix,
        Day,
        Value,
    }
}
