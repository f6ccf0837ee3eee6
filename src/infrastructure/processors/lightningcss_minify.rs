use super::options::{BrowserTargets, LightningCssOptions, MinifyFn, MinifyInput, MinifyOutput};
use crate::utils::{Result, SokuError};
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserFlags, ParserOptions, StyleSheet},
    targets::{Browsers, Targets},
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

/// Minify function for the Lightning CSS backend
pub const LIGHTNING_CSS_MINIFY: MinifyFn<LightningCssOptions> =
    MinifyFn::new("lightningCssMinify", lightning_css_minify);

pub fn lightning_css_minify(
    input: &MinifyInput<'_>,
    options: &LightningCssOptions,
) -> Result<MinifyOutput> {
    let browsers = resolve_browsers(options.targets.as_ref())
        .map_err(|e| SokuError::minify(input.name, e))?;
    let targets = Targets {
        browsers,
        ..Targets::default()
    };

    let warnings = Arc::new(RwLock::new(Vec::new()));
    let parser_options = ParserOptions {
        filename: input.name.to_string(),
        flags: parser_flags(options),
        error_recovery: options.error_recovery.unwrap_or(false),
        warnings: Some(Arc::clone(&warnings)),
        ..ParserOptions::default()
    };

    let mut stylesheet = StyleSheet::parse(input.source, parser_options)
        .map_err(|e| SokuError::minify(input.name, format!("parse error: {}", e)))?;

    let unused_symbols: HashSet<String> = options
        .unused_symbols
        .iter()
        .flatten()
        .cloned()
        .collect();

    stylesheet
        .minify(MinifyOptions {
            targets,
            unused_symbols,
        })
        .map_err(|e| SokuError::minify(input.name, format!("minify error: {}", e)))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| SokuError::minify(input.name, format!("print error: {}", e)))?;

    let warnings = match warnings.read() {
        Ok(list) => list.iter().map(|w| w.to_string()).collect(),
        Err(_) => Vec::new(),
    };

    Ok(MinifyOutput {
        code: result.code,
        warnings,
    })
}

fn parser_flags(options: &LightningCssOptions) -> ParserFlags {
    let mut flags = ParserFlags::empty();
    if let Some(drafts) = &options.drafts {
        if drafts.nesting.unwrap_or(false) {
            flags |= ParserFlags::NESTING;
        }
        if drafts.custom_media.unwrap_or(false) {
            flags |= ParserFlags::CUSTOM_MEDIA;
        }
    }
    flags
}

/// Turn configured targets into Lightning CSS browser versions.
///
/// No targets means no downleveling.
pub(crate) fn resolve_browsers(
    targets: Option<&BrowserTargets>,
) -> std::result::Result<Option<Browsers>, String> {
    match targets {
        None => Ok(None),
        Some(BrowserTargets::Query(query)) => Browsers::from_browserslist([query.as_str()])
            .map_err(|e| format!("invalid browserslist query '{}': {}", query, e)),
        Some(BrowserTargets::Queries(queries)) => {
            Browsers::from_browserslist(queries.iter().map(String::as_str))
                .map_err(|e| format!("invalid browserslist queries {:?}: {}", queries, e))
        }
        Some(BrowserTargets::Versions(versions)) => browsers_from_versions(versions).map(Some),
    }
}

fn browsers_from_versions(
    versions: &BTreeMap<String, u32>,
) -> std::result::Result<Browsers, String> {
    let mut browsers = Browsers::default();
    for (browser, version) in versions {
        let slot = match browser.as_str() {
            "android" => &mut browsers.android,
            "chrome" => &mut browsers.chrome,
            "edge" => &mut browsers.edge,
            "firefox" => &mut browsers.firefox,
            "ie" => &mut browsers.ie,
            "ios_saf" | "ios" => &mut browsers.ios_saf,
            "opera" => &mut browsers.opera,
            "safari" => &mut browsers.safari,
            "samsung" => &mut browsers.samsung,
            other => return Err(format!("unknown target browser '{}'", other)),
        };
        *slot = Some(*version);
    }
    Ok(browsers)
}
