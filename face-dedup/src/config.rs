use common_rekognition::RekognitionConfig;
use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    // Empty when unset, invocations then fail with a ConfigurationError
    #[envconfig(from = "REKOGNITION_COLLECTION_ID", default = "")]
    pub collection_id: String,

    #[envconfig(nested = true)]
    pub rekognition: RekognitionConfig,
}

impl Config {
    pub fn new(collection_id: &str) -> Self {
        Self {
            collection_id: collection_id.to_owned(),
            rekognition: RekognitionConfig::default(),
        }
    }
}
