//! Model listing functionality

use chrono::DateTime;

use crate::core::model::{ModelClient, ModelDescriptor};

pub fn list_models(client: &dyn ModelClient) {
    print!("{}", format_model_list(&client.descriptors(), &client.model_id()));
}

fn format_model_list(models: &[ModelDescriptor], active: &str) -> String {
    let mut out = String::new();
    out.push_str("🤖 Available Mistral models\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    if models.is_empty() {
        out.push_str("No models available for this API key.\n");
        return out;
    }

    for model in models {
        let marker = if model.id == active { " (default)" } else { "" };
        out.push_str(&format!("  • {}{marker}\n", model.id));
        if !model.description.trim().is_empty() {
            out.push_str(&format!("    {}\n", model.description.trim()));
        }
        if let Some(length) = model.max_context_length {
            out.push_str(&format!("    Context: {length} tokens\n"));
        }
        if let Some(date) = model
            .created
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            out.push_str(&format!("    Created: {}\n", date.format("%Y-%m-%d")));
        }
    }
    out
}
