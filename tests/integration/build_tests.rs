use soku_css_minimizer::config::{ConfigLoader, CONFIG_FILE_NAME};
use soku_css_minimizer::core::interfaces::BuildService;
use soku_css_minimizer::core::models::{BuildConfig, BuildMode, EnvironmentConfig, MinifyConfig};
use soku_css_minimizer::core::services::CssBuildService;
use soku_css_minimizer::infrastructure::TokioFileSystemService;
use soku_css_minimizer::plugins::{plugin_css_minimizer, MinifierSelection};
use soku_css_minimizer::utils::SokuError;
use std::path::Path;
use std::sync::Arc;

const INDEX_CSS: &str = r#"
:root {
  --test: 1;
}

.page {
  margin: 0px 0px 0px 0px;

  & .title {
    color: #ff0000;
    font-weight: bold;
  }
}
"#;

const PLAYGROUND_CONFIG: &str = r#"{
  "cssMinimizer": {
    "minifier": "lightningcss",
    "lightningCssOptions": {
      "minimizerOptions": {
        "targets": ["> 0.25%", "not dead"],
        "drafts": { "nesting": true }
      }
    }
  }
}"#;

fn write_fixture(root: &Path, config: &str) {
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(root.join("src/index.css"), INDEX_CSS).unwrap();
    std::fs::write(root.join(CONFIG_FILE_NAME), config).unwrap();
}

fn service_for(root: &Path, mode: BuildMode) -> (CssBuildService, BuildConfig) {
    let project = ConfigLoader::load(root, Some(mode), None).unwrap();
    let service = CssBuildService::new(Arc::new(TokioFileSystemService))
        .with_plugin(plugin_css_minimizer(Some(project.css_minimizer)));
    (service, project.build)
}

#[tokio::test]
async fn test_production_build_minifies_with_lightningcss() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_fixture(root, PLAYGROUND_CONFIG);

    let (service, config) = service_for(root, BuildMode::Production);
    let result = service.build(&config).await;
    assert!(result.is_ok(), "Build should succeed: {:?}", result.as_ref().err());

    let result = result.unwrap();
    assert!(result.success);
    assert_eq!(result.environments.len(), 1);
    assert_eq!(result.environments[0].minimizers, vec!["css"]);

    let output_path = root.join("dist/src/index.css");
    assert!(output_path.exists(), "minified stylesheet should exist");

    let css = std::fs::read_to_string(&output_path).unwrap();
    assert!(css.len() < INDEX_CSS.len());
    assert!(!css.contains('\n'));
    assert!(css.contains("--test:1"), "marker value should survive: {}", css);
    assert!(css.contains(".title"));
}

#[tokio::test]
async fn test_development_build_leaves_css_untouched() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_fixture(root, PLAYGROUND_CONFIG);

    let (service, config) = service_for(root, BuildMode::Development);
    let result = service.build(&config).await.unwrap();

    assert!(result.environments[0].minimizers.is_empty());
    let css = std::fs::read_to_string(root.join("dist/src/index.css")).unwrap();
    assert_eq!(css, INDEX_CSS);
}

#[tokio::test]
async fn test_disabled_css_minify_skips_minimizer() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_fixture(
        root,
        r#"{
          "output": { "minify": { "js": true } },
          "cssMinimizer": { "minifier": "lightningcss" }
        }"#,
    );

    let (service, config) = service_for(root, BuildMode::Production);
    let result = service.build(&config).await.unwrap();

    assert!(result.environments[0].minimizers.is_empty());
    let css = std::fs::read_to_string(root.join("dist/src/index.css")).unwrap();
    assert_eq!(css, INDEX_CSS);
}

#[tokio::test]
async fn test_environments_are_configured_independently() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_fixture(root, PLAYGROUND_CONFIG);

    let (service, mut config) = service_for(root, BuildMode::Production);
    config
        .environments
        .insert("web".to_string(), EnvironmentConfig::default());
    config.environments.insert(
        "debug".to_string(),
        EnvironmentConfig {
            dist_path: None,
            minify: Some(MinifyConfig::Enabled(false)),
        },
    );

    let result = service.build(&config).await.unwrap();
    assert_eq!(result.environments.len(), 2);
    assert_eq!(result.environments[0].minimizers, vec!["css"]);
    assert!(result.environments[1].minimizers.is_empty());

    let web_css = std::fs::read_to_string(root.join("dist/web/src/index.css")).unwrap();
    let debug_css = std::fs::read_to_string(root.join("dist/debug/src/index.css")).unwrap();
    assert!(!web_css.contains('\n'));
    assert_eq!(debug_css, INDEX_CSS);
}

#[tokio::test]
async fn test_rebuild_ignores_previous_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_fixture(root, PLAYGROUND_CONFIG);

    let (service, config) = service_for(root, BuildMode::Production);
    service.build(&config).await.unwrap();
    let second = service.build(&config).await.unwrap();

    assert_eq!(second.output_files().count(), 1);
}

#[tokio::test]
async fn test_invalid_targets_fail_the_build() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_fixture(
        root,
        r#"{
          "cssMinimizer": {
            "minifier": "lightningcss",
            "lightningCssOptions": { "minimizerOptions": { "targets": { "netscape": 262144 } } }
          }
        }"#,
    );

    let (service, config) = service_for(root, BuildMode::Production);
    assert!(service.build(&config).await.is_err());
    assert!(!root.join("dist").exists());
}

#[tokio::test]
async fn test_cli_minifier_override() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_fixture(root, PLAYGROUND_CONFIG);

    let project =
        ConfigLoader::load(root, None, Some(MinifierSelection::Cssnano)).unwrap();
    assert_eq!(project.build.mode, BuildMode::Production);
    assert_eq!(project.css_minimizer.minifier, MinifierSelection::Cssnano);
    // Overrides for the unselected backend stay in place but are never consulted
    assert!(project.css_minimizer.lightning_css_options.is_some());
}

#[tokio::test]
async fn test_minify_failure_reports_environment_and_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_fixture(root, PLAYGROUND_CONFIG);
    std::fs::write(root.join("src/broken.css"), "..broken { color: red; }").unwrap();

    let (service, config) = service_for(root, BuildMode::Production);
    let err = service.build(&config).await.unwrap_err();

    match &err {
        SokuError::Build {
            context: Some(context),
            ..
        } => {
            assert_eq!(context.environment.as_deref(), Some("web"));
            assert_eq!(context.file_path, Some(root.join("src/broken.css")));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.format_detailed().contains("broken.css"));
}
