use std::io::{Read, Write};

use keeval_store::{ConfigStore, ObjectBackend};
use tracing::debug;

use crate::cli::{Action, Mode};
use crate::error::{CliError, CliResult};

/// Run one invocation against `store`.
///
/// `input` supplies the value for `write` or the key list in JSON mode;
/// only successful payloads are written to `output`.
pub async fn run_command<B, R, W>(
    action: Action,
    mode: &Mode,
    store: &ConfigStore<B>,
    input: R,
    mut output: W,
) -> CliResult<()>
where
    B: ObjectBackend,
    R: Read,
    W: Write,
{
    match mode {
        Mode::Json => cmd_json(action, store, input, &mut output).await?,
        Mode::Single(key) => match action {
            Action::Read => cmd_read(store, key, &mut output).await?,
            Action::Write => cmd_write(store, key, input, &mut output).await?,
            Action::List => cmd_list(store, key, &mut output).await?,
        },
    }
    output.flush()?;
    Ok(())
}

async fn cmd_read<B: ObjectBackend>(
    store: &ConfigStore<B>,
    key: &str,
    output: &mut impl Write,
) -> CliResult<()> {
    let values = store.read(key).await?;
    if let Some(value) = values.values().next() {
        write!(output, "{value}")?;
    }
    Ok(())
}

async fn cmd_write<B: ObjectBackend>(
    store: &ConfigStore<B>,
    key: &str,
    mut input: impl Read,
    output: &mut impl Write,
) -> CliResult<()> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let status = store.write(key, data).await?;
    write!(output, "{status}")?;
    Ok(())
}

async fn cmd_list<B: ObjectBackend>(
    store: &ConfigStore<B>,
    key: &str,
    output: &mut impl Write,
) -> CliResult<()> {
    for path in store.list(key).await? {
        writeln!(output, "{path}")?;
    }
    Ok(())
}

async fn cmd_json<B: ObjectBackend>(
    action: Action,
    store: &ConfigStore<B>,
    input: impl Read,
    output: &mut impl Write,
) -> CliResult<()> {
    let keys: Vec<String> = serde_json::from_reader(input).map_err(CliError::InputFormat)?;

    let values = match action {
        Action::Read => store.read_bulk(&keys).await?,
        Action::Write | Action::List => {
            debug!(?action, count = keys.len(), "action has no effect in JSON mode");
            Default::default()
        }
    };

    serde_json::to_writer(&mut *output, &values).map_err(std::io::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use keeval_store::{InMemoryBackend, StoreConfig};

    use super::*;

    fn store(prefix: Option<&str>) -> ConfigStore<InMemoryBackend> {
        let mut config = StoreConfig::new("bucket");
        config.prefix = prefix.map(str::to_string);
        ConfigStore::new(InMemoryBackend::new(), config).unwrap()
    }

    async fn run(
        action: Action,
        mode: Mode,
        store: &ConfigStore<InMemoryBackend>,
        input: &str,
    ) -> (CliResult<()>, String) {
        let mut output = Vec::new();
        let result = run_command(action, &mode, store, input.as_bytes(), &mut output).await;
        (result, String::from_utf8(output).unwrap())
    }

    // -----------------------------------------------------------------------
    // Single-key mode
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn read_prints_bare_value() {
        let store = store(None);
        store.backend().insert("svc/port", "8080\n");
        let (result, out) = run(Action::Read, Mode::Single("svc.port".into()), &store, "").await;
        result.unwrap();
        assert_eq!(out, "8080");
    }

    #[tokio::test]
    async fn read_with_prefix_prints_value() {
        let store = store(Some("env1"));
        store.backend().insert("env1/svc/port", "8080");
        let (result, out) = run(Action::Read, Mode::Single("svc.port".into()), &store, "").await;
        result.unwrap();
        assert_eq!(out, "8080");
    }

    #[tokio::test]
    async fn read_missing_key_writes_nothing() {
        let store = store(None);
        let (result, out) = run(Action::Read, Mode::Single("no.such".into()), &store, "").await;
        let err = result.unwrap_err();
        assert!(out.is_empty());
        let message = err.to_string();
        assert!(message.contains("no/such"), "{message}");
        assert!(message.contains("NoSuchKey"), "{message}");
    }

    #[tokio::test]
    async fn write_stores_stdin_and_prints_success() {
        let store = store(Some("env1"));
        let (result, out) = run(
            Action::Write,
            Mode::Single("svc.port".into()),
            &store,
            "8080\n",
        )
        .await;
        result.unwrap();
        assert_eq!(out, "Success");
        assert_eq!(store.backend().get("env1/svc/port").unwrap(), b"8080\n");
    }

    #[tokio::test]
    async fn write_then_read_round_trips_trimmed() {
        let store = store(None);
        run(Action::Write, Mode::Single("a.b".into()), &store, "  value  \n")
            .await
            .0
            .unwrap();
        let (result, out) = run(Action::Read, Mode::Single("a.b".into()), &store, "").await;
        result.unwrap();
        assert_eq!(out, "value");
    }

    #[tokio::test]
    async fn write_failure_is_store_error() {
        let store = store(None);
        store.backend().deny("ro/key");
        let (result, out) = run(Action::Write, Mode::Single("ro.key".into()), &store, "v").await;
        assert!(matches!(result, Err(CliError::Store(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn list_prints_raw_paths() {
        let store = store(Some("env1"));
        store.backend().insert("env1/svc/port", "1");
        store.backend().insert("env1/svc/host", "2");
        let (result, out) = run(Action::List, Mode::Single("svc".into()), &store, "").await;
        result.unwrap();
        assert_eq!(out, "env1/svc/host\nenv1/svc/port\n");
    }

    // -----------------------------------------------------------------------
    // JSON mode
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn json_read_prints_one_object() {
        let store = store(None);
        store.backend().insert("a/b", "1");
        store.backend().insert("c/d", "2");
        let (result, out) = run(Action::Read, Mode::Json, &store, r#"["a.b", "c.d"]"#).await;
        result.unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!({"a.b": "1", "c.d": "2"}));
    }

    #[tokio::test]
    async fn json_read_keys_include_prefix() {
        let store = store(Some("env1"));
        store.backend().insert("env1/svc/port", "8080");
        let (result, out) = run(Action::Read, Mode::Json, &store, r#"["svc.port"]"#).await;
        result.unwrap();
        assert_eq!(out, r#"{"env1.svc.port":"8080"}"#);
    }

    #[tokio::test]
    async fn json_write_touches_nothing() {
        let store = store(None);
        let (result, out) = run(Action::Write, Mode::Json, &store, r#"["a.b", "c.d"]"#).await;
        result.unwrap();
        assert_eq!(out, "{}");
        assert_eq!(store.backend().put_count(), 0);
        assert!(store.backend().is_empty());
    }

    #[tokio::test]
    async fn json_malformed_input_is_input_format_error() {
        let store = store(None);
        let (result, out) = run(Action::Read, Mode::Json, &store, "[not json").await;
        assert!(matches!(result, Err(CliError::InputFormat(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn json_non_string_keys_rejected() {
        let store = store(None);
        let (result, _) = run(Action::Read, Mode::Json, &store, r#"{"a": 1}"#).await;
        assert!(matches!(result, Err(CliError::InputFormat(_))));
    }

    #[tokio::test]
    async fn json_read_aborts_on_missing_key() {
        let store = store(None);
        store.backend().insert("a/b", "1");
        let (result, out) = run(Action::Read, Mode::Json, &store, r#"["a.b", "x.y"]"#).await;
        assert!(matches!(result, Err(CliError::Store(_))));
        assert!(out.is_empty());
    }
}
