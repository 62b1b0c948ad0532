//! Command-line front end for `valdiff-core`.
//!
//! Reads two JSON or YAML documents, runs them through the assertion
//! facade and prints the failure message when they differ.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use valdiff_core::assert::{Engine, CALL_KEYS};
use valdiff_core::{AssertError, EngineConfig, Object, PropertyKey, PropertyValue, Value};

const LOG_ENV: &str = "VALDIFF_LOG";
const EXIT_EQUAL: i32 = 0;
const EXIT_DIFFERENT: i32 = 1;
const EXIT_USAGE: i32 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum OrderArg {
    Natural,
    Sort,
}

impl OrderArg {
    fn as_str(self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Sort => "sort",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "valdiff",
    version,
    about = "Compare two JSON or YAML documents and print where they differ.",
    override_usage = "valdiff [OPTIONS] ACTUAL [EXPECT]",
    after_help = "When EXPECT is omitted the second document is read from STDIN.\n\
                  Exit status is 0 when the documents are equal, 1 when they differ and 2 on errors."
)]
struct Cli {
    /// Read both documents as YAML instead of JSON.
    #[arg(long = "yaml", action = ArgAction::SetTrue)]
    yaml: bool,

    /// Render differences using ANSI colors.
    #[arg(long = "color", action = ArgAction::SetTrue)]
    color: bool,

    /// Maximum width of rendered lines.
    #[arg(long = "max-columns", value_name = "N")]
    max_columns: Option<u32>,

    /// Nesting depth shown below the first difference.
    #[arg(long = "max-depth", value_name = "N")]
    max_depth: Option<u32>,

    /// Number of differences reported before the rest are collapsed.
    #[arg(long = "max-diff", value_name = "N")]
    max_diff: Option<u32>,

    /// Order in which object properties are displayed.
    #[arg(long = "order", value_enum)]
    order: Option<OrderArg>,

    /// Lay out every differing group one row per child.
    #[arg(long = "multiline", action = ArgAction::SetTrue)]
    multiline: bool,

    /// JSON object of assertion options, e.g. '{"MAX_CONTEXT_AFTER_DIFF":{"line":5}}'.
    #[arg(long = "opts", value_name = "JSON")]
    opts: Option<String>,

    /// First line of the failure message.
    #[arg(long = "message", value_name = "TEXT")]
    message: Option<String>,

    /// Write the failure message to FILE instead of STDOUT.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// The actual document.
    #[arg(value_name = "ACTUAL")]
    actual: OsString,

    /// The expected document; STDIN when omitted.
    #[arg(value_name = "EXPECT")]
    expect: Option<OsString>,
}

fn main() {
    match try_main() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let _ = writeln!(io::stderr(), "{err:#}");
            std::process::exit(EXIT_USAGE);
        }
    }
}

fn try_main() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing();

    let actual_text = read_input(&InputSource::File(path_from(&cli.actual)?))?;
    let expect_source = match &cli.expect {
        Some(path) => InputSource::File(path_from(path)?),
        None => InputSource::Stdin,
    };
    let expect_text = read_input(&expect_source)?;
    let actual = parse_document(&actual_text, cli.yaml).context("failed to parse ACTUAL")?;
    let expect = parse_document(&expect_text, cli.yaml).context("failed to parse EXPECT")?;

    let call = build_call(&cli, actual, expect)?;
    let engine = Engine::new(EngineConfig::default().with_color(cli.color));
    match engine.assert_call(&call.into()) {
        Ok(()) => {
            tracing::debug!("documents are equal");
            Ok(EXIT_EQUAL)
        }
        Err(AssertError::Assertion(failure)) => {
            let mut rendered = failure.message().to_owned();
            rendered.push('\n');
            write_output(cli.output.as_ref(), &rendered)?;
            Ok(EXIT_DIFFERENT)
        }
        Err(err) => Err(anyhow!(err)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn path_from(input: &OsString) -> Result<PathBuf> {
    let path = PathBuf::from(input);
    if path.as_os_str().is_empty() {
        bail!("expected file path; got empty string");
    }
    Ok(path)
}

fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::File(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read STDIN")?;
            Ok(buffer)
        }
    }
}

fn parse_document(input: &str, yaml: bool) -> Result<Value> {
    if yaml {
        Value::from_yaml_str(input).map_err(|err| anyhow!(err))
    } else {
        Value::from_json_str(input).map_err(|err| anyhow!(err))
    }
}

/// Builds the `{ actual, expect, ... }` call object; flags override keys
/// given through `--opts`.
fn build_call(cli: &Cli, actual: Value, expect: Value) -> Result<Object> {
    let call = Object::plain().with_property("actual", actual).with_property("expect", expect);
    if let Some(raw) = &cli.opts {
        for (key, value) in parse_opts(raw)? {
            call.insert(key, value);
        }
    }
    if let Some(columns) = cli.max_columns {
        call.insert("MAX_COLUMNS", f64::from(columns));
    }
    if let Some(depth) = cli.max_depth {
        call.insert("MAX_DEPTH", f64::from(depth));
    }
    if let Some(max_diff) = cli.max_diff {
        call.insert("MAX_DIFF", f64::from(max_diff));
    }
    if let Some(order) = cli.order {
        call.insert("order", order.as_str());
    }
    if cli.multiline {
        call.insert("forceMultilineDiff", true);
    }
    if let Some(message) = &cli.message {
        call.insert("message", message.as_str());
    }
    Ok(call)
}

fn parse_opts(raw: &str) -> Result<Vec<(String, Value)>> {
    let trimmed = raw.trim();
    let value = Value::from_json_str(trimmed).with_context(|| format!("failed to parse --opts JSON: {trimmed}"))?;
    let Some(object) = value.as_object() else {
        bail!("--opts expects a JSON object, but received {}", value.notation());
    };
    let data = object.data();
    let mut options = Vec::with_capacity(data.properties().len());
    for prop in data.properties() {
        let (PropertyKey::String(key), PropertyValue::Data { value, .. }) = (&prop.key, &prop.descriptor.value)
        else {
            continue;
        };
        if matches!(key.as_str(), "actual" | "expect") {
            bail!("--opts cannot set `{key}`; pass documents as arguments");
        }
        if !CALL_KEYS.contains(&key.as_str()) {
            bail!("unsupported --opts option: {key}");
        }
        options.push((key.clone(), value.clone()));
    }
    Ok(options)
}

fn write_output(path: Option<&PathBuf>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, rendered.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display())),
        None => {
            print!("{rendered}");
            io::stdout().flush().ok();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("valdiff").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_opts() {
        let cli = cli(&["--opts", "{\"MAX_COLUMNS\":40,\"order\":\"natural\"}", "--max-columns", "60", "a.json"]);
        let call = build_call(&cli, Value::Null, Value::Null).expect("call builds");
        let data = call.data();
        assert_eq!(data.get("MAX_COLUMNS").and_then(Value::as_f64), Some(60.0));
        assert_eq!(data.get("order").and_then(Value::as_str), Some("natural"));
    }

    #[test]
    fn opts_reject_documents_and_unknown_keys() {
        let err = parse_opts("{\"actual\":1}").unwrap_err();
        assert!(err.to_string().contains("cannot set `actual`"));
        let err = parse_opts("{\"precision\":1}").unwrap_err();
        assert_eq!(err.to_string(), "unsupported --opts option: precision");
        let err = parse_opts("[1]").unwrap_err();
        assert!(err.to_string().contains("expects a JSON object"));
    }

    #[test]
    fn yaml_documents_parse() {
        let value = parse_document("a: 1\nb: [x, y]\n", true).expect("yaml parses");
        let object = value.as_object().expect("object");
        assert!(object.data().get("b").is_some());
    }
}
