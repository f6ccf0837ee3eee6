// cssnano backend
// cssnano only exists as a PostCSS plugin, so minification is delegated to a
// Node.js child process resolved from the current working directory.

use super::options::{CssnanoOptions, MinifyFn, MinifyInput, MinifyOutput};
use crate::utils::{Result, SokuError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Command, Stdio};

/// Minify function for the cssnano backend
pub const CSSNANO_MINIFY: MinifyFn<CssnanoOptions> = MinifyFn::new("cssnanoMinify", cssnano_minify);

/// Overrides the Node.js executable used to run cssnano
pub const NODE_BINARY_ENV: &str = "SOKU_NODE_BINARY";

const CSSNANO_BRIDGE: &str = r#"
const postcss = require('postcss');
const cssnano = require('cssnano');
let input = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (chunk) => { input += chunk; });
process.stdin.on('end', async () => {
  try {
    const { css, from, options } = JSON.parse(input);
    const result = await postcss([cssnano(options)]).process(css, { from });
    const warnings = result.warnings().map((w) => w.toString());
    process.stdout.write(JSON.stringify({ css: result.css, warnings }));
  } catch (err) {
    process.stderr.write(String((err && err.stack) || err));
    process.exit(1);
  }
});
"#;

#[derive(Serialize)]
struct BridgeRequest<'a> {
    css: &'a str,
    from: &'a str,
    options: &'a CssnanoOptions,
}

#[derive(Deserialize)]
struct BridgeResponse {
    css: String,
    #[serde(default)]
    warnings: Vec<String>,
}

pub fn cssnano_minify(input: &MinifyInput<'_>, options: &CssnanoOptions) -> Result<MinifyOutput> {
    minify_with_node(&node_binary(), input, options)
}

fn minify_with_node(
    node: &str,
    input: &MinifyInput<'_>,
    options: &CssnanoOptions,
) -> Result<MinifyOutput> {
    run_bridge(node, input, options)
        .map_err(|e| SokuError::minify(input.name, format!("{:#}", e)))
}

fn node_binary() -> String {
    std::env::var(NODE_BINARY_ENV).unwrap_or_else(|_| "node".to_string())
}

fn run_bridge(
    node: &str,
    input: &MinifyInput<'_>,
    options: &CssnanoOptions,
) -> anyhow::Result<MinifyOutput> {
    let request = serde_json::to_vec(&BridgeRequest {
        css: input.source,
        from: input.name,
        options,
    })?;

    let mut child = Command::new(node)
        .arg("-e")
        .arg(CSSNANO_BRIDGE)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start `{}` to run cssnano", node))?;

    // Dropping stdin closes the pipe so the bridge sees end of input.
    // A process that already exited reports through its status below.
    let sent = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(&request),
        None => Ok(()),
    };

    let output = child
        .wait_with_output()
        .context("failed to wait for cssnano")?;

    if !output.status.success() {
        anyhow::bail!(
            "cssnano exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    sent.context("failed to send stylesheet to cssnano")?;

    let response: BridgeResponse =
        serde_json::from_slice(&output.stdout).context("unexpected output from cssnano")?;

    Ok(MinifyOutput {
        code: response.css,
        warnings: response.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::processors::options::CssnanoPreset;
    use serde_json::json;

    #[test]
    fn test_request_payload_shape() {
        let options = CssnanoOptions {
            preset: Some(CssnanoPreset::WithOptions(
                "default".to_string(),
                json!({ "mergeLonghand": false }).as_object().cloned().unwrap_or_default(),
            )),
            ..Default::default()
        };

        let payload = serde_json::to_value(BridgeRequest {
            css: "a { color: red }",
            from: "index.css",
            options: &options,
        })
        .unwrap();

        assert_eq!(payload["from"], "index.css");
        assert_eq!(payload["options"]["preset"], json!(["default", { "mergeLonghand": false }]));
        assert!(payload["options"].get("configFile").is_none());
    }

    #[test]
    fn test_response_without_warnings() {
        let response: BridgeResponse = serde_json::from_str(r#"{"css": "a{color:red}"}"#).unwrap();
        assert_eq!(response.css, "a{color:red}");
        assert!(response.warnings.is_empty());
    }

    fn sample_input() -> MinifyInput<'static> {
        MinifyInput {
            name: "a.css",
            source: "a { color: red }",
        }
    }

    #[test]
    fn test_missing_node_binary_is_minify_error() {
        let err = minify_with_node("/nonexistent/node-binary", &sample_input(), &Default::default())
            .unwrap_err();
        match err {
            SokuError::Minify { asset, message } => {
                assert_eq!(asset, "a.css");
                assert!(message.contains("failed to start `/nonexistent/node-binary`"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_minify_error() {
        let err = minify_with_node("false", &sample_input(), &Default::default()).unwrap_err();
        match err {
            SokuError::Minify { asset, message } => {
                assert_eq!(asset, "a.css");
                assert!(message.contains("cssnano exited with"), "{}", message);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_minify_fn_name() {
        assert_eq!(CSSNANO_MINIFY.name(), "cssnanoMinify");
    }
}
