use crate::api::{construct_api_url, summarize_error_body, ModelsResponse};
use crate::core::model::{ModelDescriptor, TransportError};

/// Lists the models the API key can use, in the order the API returns them.
pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
) -> Result<Vec<ModelDescriptor>, TransportError> {
    let response = client
        .get(construct_api_url(base_url, "models"))
        .header("Content-Type", "application/json")
        .bearer_auth(api_key)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status,
            summary: summarize_error_body(&body),
        });
    }

    let models = response.json::<ModelsResponse>().await?;
    Ok(dedup_models(models))
}

/// The API may list aliases more than once; the first entry wins.
fn dedup_models(response: ModelsResponse) -> Vec<ModelDescriptor> {
    let mut seen = std::collections::HashSet::new();
    response
        .data
        .into_iter()
        .filter(|info| seen.insert(info.id.clone()))
        .map(ModelDescriptor::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_keep_first_entry_and_order() {
        let response: ModelsResponse = serde_json::from_str(
            r#"{"data":[
                {"id":"mistral-large","description":"first"},
                {"id":"mistral-tiny"},
                {"id":"mistral-large","description":"second"}
            ]}"#,
        )
        .expect("parse");

        let models = dedup_models(response);
        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["mistral-large", "mistral-tiny"]);
        assert_eq!(models[0].description, "first");
    }
}
