pub mod classifier;
mod client;
pub mod endpoints;
mod error;
mod macros;
pub mod repositories;
pub mod request;
pub mod transport;
pub mod uploads;

pub use crate::client::{Client, ServiceClients};
pub use crate::error::{ApiError, ErrorKind, ValidationError};
pub use crate::request::{ApiRequest, EmptyResponse, Page, RequestData};
pub use crate::transport::{FilePart, HttpRequest, HttpResponse, Transport, TransportError};
use repositories::*;

pub struct Request;

impl Request {
    pub fn jobs() -> JobRepository {
        JobRepository::new()
    }

    pub fn skills() -> SkillRepository {
        SkillRepository::new()
    }

    pub fn applications() -> ApplicationRepository {
        ApplicationRepository::new()
    }

    pub fn cvs() -> CvRepository {
        CvRepository::new()
    }

    pub fn reports() -> ReportRepository {
        ReportRepository::new()
    }

    pub fn profile() -> ProfileRepository {
        ProfileRepository::new()
    }

    pub fn notifications() -> NotificationRepository {
        NotificationRepository::new()
    }

    pub fn admin() -> AdminRepository {
        AdminRepository::new()
    }
}
