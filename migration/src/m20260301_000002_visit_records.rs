//! 访问记录表迁移
//!
//! 创建 visit_records 表，每次重定向一行：
//! - 服务端观测数据（请求头、时间、地理提示）
//! - 客户端异步回传的指纹数据（client / behavior / combined）
//! - 内容哈希（combined 的 SHA-256）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VisitRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VisitRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VisitRecords::LinkId).big_integer().not_null())
                    .col(ColumnDef::new(VisitRecords::RequestorIp).string_len(45).null())
                    .col(ColumnDef::new(VisitRecords::UserAgent).text().null())
                    .col(
                        ColumnDef::new(VisitRecords::ServerObservedData)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VisitRecords::ClientPayload).text().null())
                    .col(ColumnDef::new(VisitRecords::BehaviorPayload).text().null())
                    .col(ColumnDef::new(VisitRecords::CombinedPayload).text().null())
                    .col(ColumnDef::new(VisitRecords::ContentHash).string_len(64).null())
                    .col(
                        ColumnDef::new(VisitRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // link_id 索引（按链接查询访问记录）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visit_records_link_id")
                    .table(VisitRecords::Table)
                    .col(VisitRecords::LinkId)
                    .to_owned(),
            )
            .await?;

        // content_hash 普通索引：相同设备可能产生相同指纹，不能加唯一约束
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visit_records_content_hash")
                    .table(VisitRecords::Table)
                    .col(VisitRecords::ContentHash)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_visit_records_content_hash")
                    .table(VisitRecords::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_visit_records_link_id")
                    .table(VisitRecords::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(VisitRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VisitRecords {
    Table,
    Id,
    LinkId,
    RequestorIp,
    UserAgent,
    ServerObservedData,
    ClientPayload,
    BehaviorPayload,
    CombinedPayload,
    ContentHash,
    CreatedAt,
}
