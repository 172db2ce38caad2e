use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CustomPromptRequest {
    pub topic: String,
}
