use tracing::warn;

use super::fenced;
use crate::services::Services;

pub const PAGE_APOLOGY: &str = "Sorry, I couldn't retrieve that Wikipedia page.";
pub const SEARCH_APOLOGY: &str = "Sorry, I couldn't search Wikipedia right now.";

pub(crate) async fn page(services: &Services, id: &str) -> String {
    match services.wiki.convert_page(id).await {
        Ok(markdown) => format!(
            "Here is the Wikipedia page `{id}`:\n\n{}",
            fenced(&markdown, "markdown")
        ),
        Err(err) => {
            warn!(id, %err, "wiki page conversion failed");
            PAGE_APOLOGY.to_string()
        }
    }
}

pub(crate) async fn search(services: &Services, query: &str) -> String {
    let hits = match services.wiki.search(query).await {
        Ok(hits) => hits,
        Err(err) => {
            warn!(query, %err, "wiki search failed");
            return SEARCH_APOLOGY.to_string();
        }
    };
    if hits.is_empty() {
        return format!("No Wikipedia pages matched `{query}`.");
    }

    let listing = hits
        .iter()
        .map(|hit| format!("{} --> {}", hit.page_id, hit.title))
        .collect::<Vec<_>>()
        .join("\n\n");
    fenced(&listing, "")
}
