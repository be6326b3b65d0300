pub mod envelope;
pub mod models;
pub mod paths;

pub use models::{CompanyId, Identity, Role, Session, SessionRecord, TokenGrant};
