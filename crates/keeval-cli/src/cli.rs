use clap::{Parser, ValueEnum};
use keeval_store::DEFAULT_BULK_WORKERS;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "keeval",
    about = "Read and write values to S3 keys",
    version,
)]
pub struct Cli {
    /// Action to perform
    #[arg(value_enum)]
    pub action: Action,

    /// S3 bucket name
    #[arg(long, env = "KEEVAL_BUCKET_NAME")]
    pub bucket: Option<String>,

    /// Key name <something.foo.bar>
    #[arg(long, conflicts_with = "json")]
    pub key: Option<String>,

    /// Read a JSON array of keys from stdin
    #[arg(long)]
    pub json: bool,

    /// Path prefix for every key
    #[arg(long, env = "KEEVAL_PREFIX")]
    pub prefix: Option<String>,

    /// Key hierarchy delimiter
    #[arg(long, env = "KEEVAL_DELIMITER")]
    pub delimiter: Option<String>,

    /// Custom S3 endpoint, e.g. a MinIO server
    #[arg(long, env = "KEEVAL_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Named AWS profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// Concurrent reads in JSON mode
    #[arg(long, default_value_t = DEFAULT_BULK_WORKERS)]
    pub workers: usize,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Read,
    Write,
    List,
}

/// Where the keys for this invocation come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// One key given with `--key`.
    Single(String),
    /// A JSON array of keys on stdin.
    Json,
}

impl Cli {
    pub fn mode(&self) -> Result<Mode, CliError> {
        if self.json {
            return Ok(Mode::Json);
        }
        match &self.key {
            Some(key) => Ok(Mode::Single(key.clone())),
            None => Err(CliError::Usage("Please specify a key.".into())),
        }
    }
}
