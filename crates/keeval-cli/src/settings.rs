//! Mapping of parsed arguments onto store settings.
//!
//! clap has already merged each flag with its environment variable (flags
//! win). Empty values are treated as unset.

use keeval_store::{CredentialOptions, StoreConfig};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

#[derive(Clone, Debug)]
pub struct Settings {
    pub store: StoreConfig,
    pub credentials: CredentialOptions,
    pub endpoint_url: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let bucket = non_empty(&cli.bucket).ok_or_else(|| {
            CliError::Usage("Please set the environment variable KEEVAL_BUCKET_NAME.".into())
        })?;

        let mut store = StoreConfig::new(bucket).with_bulk_workers(cli.workers);
        store.prefix = non_empty(&cli.prefix);
        if let Some(delimiter) = non_empty(&cli.delimiter) {
            store.delimiter = delimiter;
        }
        store
            .validate()
            .map_err(|e| CliError::Usage(e.to_string()))?;

        Ok(Self {
            store,
            credentials: CredentialOptions {
                profile: non_empty(&cli.profile),
                access_key_id: non_empty(&cli.access_key_id),
                secret_access_key: non_empty(&cli.secret_access_key),
                session_token: non_empty(&cli.session_token),
            },
            endpoint_url: non_empty(&cli.endpoint_url),
        })
    }
}
