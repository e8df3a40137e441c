//! Service routing for the smart HTTP subtransport: the fixed table mapping each
//! protocol service to its URL suffix, HTTP method, and request content type.

use super::types::{HttpMethod, Service};

pub const UPLOAD_PACK_LS_URL: &str = "/info/refs?service=git-upload-pack";
pub const UPLOAD_PACK_URL: &str = "/git-upload-pack";
pub const RECEIVE_PACK_LS_URL: &str = "/info/refs?service=git-receive-pack";
pub const RECEIVE_PACK_URL: &str = "/git-receive-pack";

const UPLOAD_PACK_REQUEST_TYPE: &str = "application/x-git-upload-pack-request";
const RECEIVE_PACK_REQUEST_TYPE: &str = "application/x-git-receive-pack-request";

/// Route entry for one smart protocol service
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ServiceRoute {
    /// Suffix appended to the repository base URL
    pub suffix: &'static str,
    /// Method used when the stream opens its exchange
    pub method: HttpMethod,
    /// Request content type; `None` for discovery requests
    pub content_type: Option<&'static str>,
}

/// Look up the fixed route for a service
pub fn route(service: Service) -> ServiceRoute {
    match service {
        Service::UploadPackLs => ServiceRoute {
            suffix: UPLOAD_PACK_LS_URL,
            method: HttpMethod::Get,
            content_type: None,
        },
        Service::UploadPack => ServiceRoute {
            suffix: UPLOAD_PACK_URL,
            method: HttpMethod::Post,
            content_type: Some(UPLOAD_PACK_REQUEST_TYPE),
        },
        Service::ReceivePackLs => ServiceRoute {
            suffix: RECEIVE_PACK_LS_URL,
            method: HttpMethod::Get,
            content_type: None,
        },
        Service::ReceivePack => ServiceRoute {
            suffix: RECEIVE_PACK_URL,
            method: HttpMethod::Post,
            content_type: Some(RECEIVE_PACK_REQUEST_TYPE),
        },
    }
}

/// Derive the request content type for a write-first stream from its URL.
///
/// Only pack exchange streams write, and their URLs always name one of the two
/// pack services, so the pack direction can be recovered from the URL alone.
pub fn request_content_type(url: &str) -> &'static str {
    if url.contains("git-upload-pack") {
        UPLOAD_PACK_REQUEST_TYPE
    } else {
        RECEIVE_PACK_REQUEST_TYPE
    }
}
