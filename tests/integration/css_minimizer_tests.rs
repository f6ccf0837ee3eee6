use serde_json::json;
use soku_css_minimizer::core::chain::{BundlerChain, CHAIN_ID};
use soku_css_minimizer::core::models::{
    Asset, BuildMode, EnvironmentContext, MinifyConfig, MinifyOptions, OutputConfig,
};
use soku_css_minimizer::core::interfaces::Minimizer;
use soku_css_minimizer::core::plugin::{ChainContext, Plugin, PluginManager};
use soku_css_minimizer::plugins::{
    plugin_css_minimizer, resolve_minimizer_config, MinifierSelection, PluginCssMinimizerOptions,
    ResolvedMinimizerConfig,
};
use std::path::PathBuf;

fn context(name: &str, mode: BuildMode, minify: MinifyConfig) -> ChainContext {
    ChainContext::new(
        EnvironmentContext {
            name: name.to_string(),
            output: OutputConfig {
                dist_path: PathBuf::from("dist"),
                minify,
            },
        },
        mode,
    )
}

fn playground_options() -> PluginCssMinimizerOptions {
    serde_json::from_value(json!({
        "minifier": "lightningcss",
        "lightningCssOptions": {
            "minimizerOptions": {
                "targets": ["> 0.25%", "not dead"],
                "drafts": { "nesting": true }
            }
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn test_default_plugin_installs_cssnano() {
    let mut manager = PluginManager::new();
    manager.register(plugin_css_minimizer(None));

    let mut chain = BundlerChain::new();
    manager
        .modify_bundler_chain(
            &mut chain,
            &context("web", BuildMode::Production, MinifyConfig::Enabled(true)),
        )
        .await
        .unwrap();

    let described = chain.describe();
    let options = &described["optimization"]["minimizer"][CHAIN_ID.minimizer.css]["options"];
    assert_eq!(options["minify"], "cssnanoMinify");
    assert_eq!(
        options["minimizerOptions"]["preset"],
        json!(["default", { "mergeLonghand": false }])
    );
}

#[tokio::test]
async fn test_guard_matrix() {
    let mut manager = PluginManager::new();
    manager.register(plugin_css_minimizer(Some(playground_options())));

    let css_enabled = MinifyConfig::Options(MinifyOptions {
        js: None,
        css: Some(true),
    });
    let css_disabled = MinifyConfig::Options(MinifyOptions {
        js: Some(true),
        css: Some(false),
    });

    let cases = [
        (BuildMode::Production, css_enabled.clone(), true),
        (BuildMode::Production, css_disabled.clone(), false),
        (BuildMode::Development, css_enabled, false),
        (BuildMode::None, css_disabled, false),
    ];

    for (mode, minify, expected) in cases {
        let mut chain = BundlerChain::new();
        manager
            .modify_bundler_chain(&mut chain, &context("web", mode, minify))
            .await
            .unwrap();
        assert_eq!(
            chain.optimization.has_minimizer(CHAIN_ID.minimizer.css),
            expected,
            "mode {:?}",
            mode
        );
    }
}

#[tokio::test]
async fn test_each_environment_gets_its_own_slot() {
    let mut manager = PluginManager::new();
    manager.register(plugin_css_minimizer(Some(playground_options())));

    let mut web = BundlerChain::new();
    let mut node = BundlerChain::new();
    manager
        .modify_bundler_chain(&mut web, &context("web", BuildMode::Production, MinifyConfig::Enabled(true)))
        .await
        .unwrap();
    manager
        .modify_bundler_chain(&mut node, &context("node", BuildMode::Production, MinifyConfig::Enabled(true)))
        .await
        .unwrap();

    assert_eq!(web.optimization.minimizer_ids(), vec![CHAIN_ID.minimizer.css]);
    assert_eq!(node.optimization.minimizer_ids(), vec![CHAIN_ID.minimizer.css]);
    assert_eq!(web.describe(), node.describe());
}

#[test]
fn test_playground_overrides_replace_default_targets() {
    let ResolvedMinimizerConfig::LightningCss(config) = resolve_minimizer_config(&playground_options())
    else {
        panic!("expected lightningcss config");
    };

    let options = serde_json::to_value(&config.minimizer_options).unwrap();
    assert_eq!(options["targets"], json!(["> 0.25%", "not dead"]));
    assert_eq!(options["drafts"], json!({ "nesting": true }));
}

#[test]
fn test_layer_array_from_json() {
    let options: PluginCssMinimizerOptions = serde_json::from_value(json!({
        "minifier": "lightningcss",
        "lightningCssOptions": [
            { "minimizerOptions": { "drafts": { "nesting": true } } },
            { "exclude": "\\.min\\.css$", "parallel": 2 }
        ]
    }))
    .unwrap();

    let serialized = serde_json::to_value(resolve_minimizer_config(&options)).unwrap();
    assert_eq!(serialized["minifier"], "lightningcss");
    assert_eq!(serialized["minimizerOptions"]["targets"], "defaults");
    assert_eq!(serialized["minimizerOptions"]["drafts"]["nesting"], true);
    assert_eq!(serialized["exclude"], "\\.min\\.css$");
    assert_eq!(serialized["parallel"], 2);
}

#[tokio::test]
async fn test_installed_minimizer_minifies_nested_css() {
    let mut chain = BundlerChain::new();
    plugin_css_minimizer(Some(playground_options()))
        .modify_bundler_chain(
            &mut chain,
            &context("web", BuildMode::Production, MinifyConfig::Enabled(true)),
        )
        .await
        .unwrap();

    let minimizer = chain
        .optimization
        .get_minimizer(CHAIN_ID.minimizer.css)
        .unwrap();
    let output = minimizer
        .minimize(vec![Asset::new(
            "index.css",
            ".app {\n  --test: 1;\n  & .title {\n    color: red;\n  }\n}\n",
        )])
        .await
        .unwrap();

    assert!(!output[0].source.contains('\n'));
    assert!(output[0].source.contains("--test:1"));
    assert!(output[0].source.contains(".title"));
}

#[test]
fn test_selection_round_trip_names() {
    assert_eq!(MinifierSelection::default(), MinifierSelection::Cssnano);
    assert_eq!(MinifierSelection::LightningCss.to_string(), "lightningcss");
}
