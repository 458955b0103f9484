use aws_config::BehaviorVersion;
use aws_sdk_rekognition::config::{retry::RetryConfig, Builder, Credentials, Region};
use aws_sdk_rekognition::Client;
use envconfig::Envconfig;
use tracing::info;

#[derive(Envconfig, Clone, Debug, Default)]
pub struct RekognitionConfig {
    // Falls back to the default AWS region chain (AWS_REGION, profile, IMDS)
    pub rekognition_region: Option<String>,

    pub rekognition_endpoint: Option<String>,

    // Only for local stacks, deployed functions use the execution role
    pub rekognition_access_key_id: Option<String>,
    pub rekognition_secret_access_key: Option<String>,
}

impl RekognitionConfig {
    /// Build an SDK client from this configuration.
    ///
    /// Uses the default AWS credential chain unless explicit credentials are provided.
    /// SDK retries are disabled: a failed search is reported to the caller as-is and
    /// redelivery is left to whatever invoked us.
    pub async fn build_client(&self) -> Client {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let mut builder = Builder::from(&sdk_config).retry_config(RetryConfig::disabled());

        if let Some(region) = &self.rekognition_region {
            builder = builder.region(Region::new(region.clone()));
        }

        if let Some(endpoint) = &self.rekognition_endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if let (Some(access_key), Some(secret_key)) = (
            &self.rekognition_access_key_id,
            &self.rekognition_secret_access_key,
        ) {
            let credentials = Credentials::new(access_key, secret_key, None, None, "env");
            builder = builder.credentials_provider(credentials);
        }

        info!(
            region = ?self.rekognition_region,
            endpoint = ?self.rekognition_endpoint,
            "Rekognition client initialized"
        );

        Client::from_conf(builder.build())
    }
}
