use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client;

pub struct S3ClientConfig<'a> {
    pub access_key_id: Option<&'a str>,
    pub secret_access_key: Option<&'a str>,
    pub region: &'a str,
    pub endpoint_url: Option<&'a str>,
    pub force_path_style: bool,
}

impl S3ClientConfig<'_> {
    fn static_credentials(&self) -> Option<Credentials> {
        match (self.access_key_id, self.secret_access_key) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some(
                Credentials::new(id, secret, None, None, "s3-folders-static"),
            ),
            _ => None,
        }
    }
}

/// Build the process-wide S3 client.
///
/// Explicit key pairs win; otherwise the default AWS provider chain
/// (environment, profile, instance metadata) resolves credentials.
pub async fn create_s3_client(config: &S3ClientConfig<'_>) -> Client {
    let region = Region::new(config.region.to_string());
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region.clone());

    if let Some(credentials) = config.static_credentials() {
        loader = loader.credentials_provider(credentials);
    }

    let sdk_config = loader.load().await;
    let mut builder = S3ConfigBuilder::from(&sdk_config).region(region);

    if let Some(endpoint_url) = config.endpoint_url {
        builder = builder.endpoint_url(endpoint_url);
    }

    if config.force_path_style {
        builder = builder.force_path_style(true);
    }

    Client::from_conf(builder.build())
}
