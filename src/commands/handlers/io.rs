use tracing::debug;

use super::fenced;
use crate::services::{ReadError, Services};

pub const NOT_FOUND: &str = "I couldn't find that file.";
pub const PERMISSION_DENIED: &str = "I don't have permission to read that file.";

fn is_url(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

pub(crate) async fn read(services: &Services, target: &str) -> String {
    let contents = if is_url(target) {
        debug!(url = target, "reading remote file");
        services
            .web
            .get(target)
            .await
            .map_err(|e| ReadError::Other(e.to_string()))
    } else {
        debug!(path = target, "reading local file");
        services.files.read(target).await
    };

    match contents {
        Ok(contents) => format!(
            "The contents of `{target}` are:\n\n{}",
            fenced(&contents, "")
        ),
        Err(ReadError::NotFound) => NOT_FOUND.to_string(),
        Err(ReadError::PermissionDenied) => PERMISSION_DENIED.to_string(),
        Err(ReadError::Other(detail)) => format!("An unexpected error occurred: {detail}"),
    }
}
