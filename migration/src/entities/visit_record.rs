//! Visit record entity
//!
//! One row per redirect. Created by the redirect handler before the
//! bootstrap page is served, later enriched by `/api/track`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "visit_records")]
pub struct Model {
    /// Tracking id embedded into the bootstrap page
    #[sea_orm(primary_key)]
    pub id: i64,
    pub link_id: i64,
    pub requestor_ip: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub server_observed_data: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub client_payload: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub behavior_payload: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub combined_payload: Option<String>,
    /// SHA-256 hex of `combined_payload`; set together with it
    pub content_hash: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
