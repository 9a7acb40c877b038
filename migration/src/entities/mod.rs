pub mod short_link;
pub mod visit_record;

pub use short_link::Entity as ShortLinkEntity;
pub use visit_record::Entity as VisitRecordEntity;
