use tracing::warn;

use super::fenced;
use crate::services::Services;

/// Opens a span of bulk reference content a front end may collapse.
pub const HIDDEN_START: &str = "HIDDEN_START";
/// Closes the span opened by [`HIDDEN_START`].
pub const HIDDEN_END: &str = "HIDDEN_END";

pub(crate) async fn repository(services: &Services, target: &str) -> String {
    match services.git.stringify(target).await {
        Ok(dump) => format!(
            "{HIDDEN_START}\nThe repository at `{target}` contains:\n\n{}\n{HIDDEN_END}\n\
I've loaded the repository `{target}`. Ask me anything about it.",
            fenced(&dump, "")
        ),
        Err(err) => {
            warn!(repo = target, %err, "repository dump failed");
            format!("I couldn't read that repository: {err}")
        }
    }
}
