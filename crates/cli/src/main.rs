//! Ezi CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** — load the JSON client configuration and build
//!    the endpoint registry from it.
//! 2. **Wire observability** — see [`observability`].
//! 3. **Construct infrastructure** — create the `ReqwestTransport` and the
//!    cookie jar and inject them into a `CrudClient`.
//! 4. **Run one call** — `list`, `create` or `remove`, then print the outcome
//!    as JSON.
//!
//! Exit codes: `0` on a success status, `1` on any other status, `2` when the
//! call could not be made at all.

mod observability;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use crud::{
    ApiName, AppName, CallOptions, CallOutcome, ClientConfig, CookieJar, CrudClient, ModelName,
    Params, StatusClass,
};
use http_transport::{ReqwestTransport, TransportConfig};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "ezi", version, about = "Issue CRUD calls against ezi JSON APIs")]
struct Cli {
    /// JSON client configuration (endpoints, base URL, timeout).
    #[arg(long, env = "EZI_CONFIG", default_value = "ezi.json")]
    config: PathBuf,

    /// Overrides the configured base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Cookie string sent with the call, e.g. `csrftoken=abc; sessionid=xyz`.
    #[arg(long, env = "EZI_COOKIE", default_value = "")]
    cookie: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// GET a record (when a pk is given) or the filtered list.
    List(CallArgs),
    /// PUT a new record.
    Create(CallArgs),
    /// DELETE a record or the filtered list.
    Remove(CallArgs),
}

#[derive(Debug, Args)]
struct CallArgs {
    app: String,
    model: String,

    /// API name within the app.
    #[arg(long, default_value = crud::DEFAULT_API_NAME)]
    api: String,

    /// Parameters as `key=value`; typed keys such as `age::int=21` are passed through.
    params: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    request_id: String,
    method: &'a str,
    url: &'a str,
    status: u16,
    class: StatusClass,
    body: serde_json::Value,
}

impl<'a> Report<'a> {
    fn new(outcome: &'a CallOutcome) -> Self {
        let body = serde_json::from_str(&outcome.body)
            .unwrap_or_else(|_| serde_json::Value::String(outcome.body.clone()));
        Self {
            request_id: outcome.request_id.to_string(),
            method: outcome.method.as_str(),
            url: &outcome.url,
            status: outcome.status,
            class: outcome.class,
            body,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("ezi: {e:#}");
            return ExitCode::from(2);
        }
    };

    let code = match run(cli).await {
        Ok(outcome) => {
            match serde_json::to_string_pretty(&Report::new(&outcome)) {
                Ok(report) => println!("{report}"),
                Err(e) => error!(error = %e, "failed to render outcome"),
            }
            if outcome.class == StatusClass::Success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = ?e, "call failed");
            eprintln!("ezi: {e:#}");
            ExitCode::from(2)
        }
    };

    telemetry.shutdown();
    code
}

async fn run(cli: Cli) -> anyhow::Result<CallOutcome> {
    let raw = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("reading config {}", cli.config.display()))?;
    let config = ClientConfig::from_json(&raw)
        .with_context(|| format!("parsing config {}", cli.config.display()))?;

    let transport = ReqwestTransport::new(TransportConfig {
        base_url: cli.base_url.or(config.base_url.clone()),
        timeout: config.timeout_secs.map(Duration::from_secs),
    })?;
    let client = CrudClient::new(config.registry(), transport, Arc::new(CookieJar::new(cli.cookie)));

    let (args, call) = match cli.command {
        Command::List(args) => (args, Call::List),
        Command::Create(args) => (args, Call::Create),
        Command::Remove(args) => (args, Call::Remove),
    };

    let app = AppName::new(args.app).ok_or_else(|| anyhow!("app name must not be empty"))?;
    let model = ModelName::new(args.model).ok_or_else(|| anyhow!("model name must not be empty"))?;
    let api = ApiName::new(args.api).ok_or_else(|| anyhow!("api name must not be empty"))?;
    let params = parse_params(&args.params)?;
    let options = CallOptions::new().api(api);

    let outcome = match call {
        Call::List => client.list_or_get(&app, &model, params, options).await?,
        Call::Create => client.create(&app, &model, params, options).await?,
        Call::Remove => client.remove(&app, &model, params, options).await?,
    };
    Ok(outcome)
}

enum Call {
    List,
    Create,
    Remove,
}

fn parse_params(raw: &[String]) -> anyhow::Result<Params> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| anyhow!("parameter '{pair}' is not in key=value form"))
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .map(|pairs| pairs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_split_on_first_equals() {
        let params = parse_params(&["age::int=21".to_string(), "q=a=b".to_string()]).unwrap();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("age::int", "21"), ("q", "a=b")]);
    }

    #[test]
    fn params_without_equals_are_rejected() {
        assert!(parse_params(&["oops".to_string()]).is_err());
        assert!(parse_params(&["=1".to_string()]).is_err());
    }

    #[test]
    fn cli_parses_a_call() {
        let cli = Cli::try_parse_from([
            "ezi", "--config", "c.json", "remove", "shop", "Person", "--api", "v2", "pk=4",
        ])
        .unwrap();
        match cli.command {
            Command::Remove(args) => {
                assert_eq!(args.app, "shop");
                assert_eq!(args.model, "Person");
                assert_eq!(args.api, "v2");
                assert_eq!(args.params, vec!["pk=4".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn report_embeds_json_bodies() {
        let outcome = CallOutcome {
            request_id: crud::RequestId::new_random(),
            method: crud::HttpMethod::Get,
            url: "/api/crud/person/".to_string(),
            status: 200,
            class: StatusClass::Success,
            body: r#"{"response": []}"#.to_string(),
        };
        let report = serde_json::to_value(Report::new(&outcome)).unwrap();
        assert_eq!(report["body"]["response"], serde_json::json!([]));
        assert_eq!(report["class"], "success");
    }
}
