use std::time::Instant;
use tracing::{debug, info, warn};

pub struct Logger;

impl Logger {
    pub fn init() {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("soku_css_minimizer=info"));

        // A second init (tests, embedding hosts) keeps the first subscriber
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }

    pub fn build_start(root: &str, mode: &str, environments: usize) {
        info!("🔨 Soku CSS Minimizer - {} build", mode);
        info!("═══════════════════════════════════════");
        info!("📁 Input: {}", root);
        info!("🌐 Environments: {}", environments);
    }

    pub fn minimizer_installed(environment: &str, slot: &str, minify: &str) {
        info!("🎨 [{}] CSS minimizer installed at '{}' using {}", environment, slot, minify);
    }

    pub fn minimizer_skipped(environment: &str, reason: &str) {
        debug!("⏭️  [{}] CSS minimizer not installed: {}", environment, reason);
    }

    pub fn minified_asset(name: &str, before: usize, after: usize) {
        debug!("⚡ Minified {} ({} → {} bytes)", name, before, after);
    }

    pub fn build_complete(files: usize, build_time: std::time::Duration, outdir: &str) {
        info!("");
        info!("📊 Build Statistics:");
        info!("  • CSS files written: {}", files);
        info!("  • Build time: {:.2?}", build_time);
        info!("  • Output directory: {}", outdir);
        info!("✅ Build completed successfully!");
    }

    pub fn info(msg: &str) {
        info!("{}", msg);
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
