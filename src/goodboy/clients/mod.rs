pub mod common;
pub mod local;
pub mod openai;

use crate::goodboy::client_wrapper::ClientWrapper;
use crate::goodboy::config::{Engine, GoodBoyConfig};
use std::sync::Arc;

/// Build the backend selected by `config.engine`.
pub fn client_from_config(config: &GoodBoyConfig) -> Arc<dyn ClientWrapper> {
    match config.engine {
        Engine::Local => {
            log::info!(
                "goodboy::clients: local engine at {} (models in {})",
                config.local_api_base,
                config.model_path.display()
            );
            Arc::new(
                local::LocalClient::new(&config.local_api_base, config.model_path.clone())
                    .with_timeout(config.request_timeout()),
            )
        }
        Engine::Cloud => {
            log::info!(
                "goodboy::clients: cloud engine at {} ({})",
                config.cloud_api_base,
                config.cloud_model
            );
            let mut client = openai::OpenAIClient::new(&config.cloud_api_base, &config.cloud_model)
                .with_timeout(config.request_timeout());
            if let Some(key) = &config.cloud_api_key {
                client = client.with_api_key(key);
            }
            Arc::new(client)
        }
    }
}
