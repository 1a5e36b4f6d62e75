//! Build command - generates the static site

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use folio_core::Config;
use folio_generator::{BuildStats, Builder};

use super::project_root;

/// Run the build command.
///
/// Loads `folio.toml` (with `FOLIO__*` environment overrides), resolves the
/// design tokens and writes the site to the output directory.
pub fn run(config_path: &Path, output: Option<&Path>, origin: Option<&str>) -> Result<BuildStats> {
    tracing::info!(?config_path, ?output, ?origin, "Starting build");

    let mut config = Config::load_with_env(config_path).wrap_err_with(|| {
        format!(
            "Failed to load configuration from {} (run `folio init` to create one)",
            config_path.display()
        )
    })?;

    if let Some(output) = output {
        config.build.output_dir = output.to_path_buf();
    }

    if let Some(origin) = origin {
        tracing::info!(origin, "Overriding site origin from CLI");
        config.site.origin = origin.to_string();
    }

    tracing::debug!(?config, "Loaded configuration");

    let root = project_root(config_path);
    let tokens = config
        .theme
        .resolve_tokens(&root)
        .wrap_err("Failed to resolve design tokens")?;

    let builder = Builder::new(config, tokens, &root);
    let output_dir = builder.output_dir();
    let stats = builder.build().wrap_err("Build failed")?;

    // Print build statistics
    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Pages:      {}", stats.pages);
    println!(
        "  Utilities:  {} ({} unmatched candidates)",
        stats.utilities, stats.unmatched
    );
    println!(
        "  Stylesheet: {} bytes, {}",
        stats.stylesheet_bytes,
        if stats.inlined { "inlined" } else { "linked" }
    );
    println!("  Sitemap:    {} URLs", stats.sitemap_urls);
    println!("  Assets:     {}", stats.assets);
    println!();
    println!("  Duration:   {}ms", stats.duration_ms);
    println!("  Output:     {}", output_dir.display());
    println!();

    tracing::info!(?stats, "Build completed successfully");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_site(dir: &Path, origin: &str) {
        fs::write(
            dir.join("folio.toml"),
            format!("[site]\norigin = \"{origin}\"\n"),
        )
        .unwrap();
        fs::create_dir_all(dir.join("src/pages")).unwrap();
        fs::write(
            dir.join("src/pages/index.html"),
            r#"<html><head></head><body class="bg-background text-text"></body></html>"#,
        )
        .unwrap();
    }

    #[test]
    fn test_build_command() {
        let dir = TempDir::new().unwrap();
        write_site(dir.path(), "https://example.com");

        let stats = run(&dir.path().join("folio.toml"), None, None).unwrap();

        assert_eq!(stats.pages, 1);
        assert_eq!(stats.utilities, 2);
        let sitemap = fs::read_to_string(dir.path().join("dist/sitemap-0.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/</loc>"));
    }

    #[test]
    fn test_build_command_origin_override() {
        let dir = TempDir::new().unwrap();
        write_site(dir.path(), "https://example.com");
        let output = dir.path().join("out");

        run(
            &dir.path().join("folio.toml"),
            Some(&output),
            Some("https://staging.example.org"),
        )
        .unwrap();

        let sitemap = fs::read_to_string(output.join("sitemap-0.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://staging.example.org/</loc>"));
    }

    #[test]
    fn test_build_command_output_over_project_is_refused() {
        let dir = TempDir::new().unwrap();
        write_site(dir.path(), "https://example.com");
        let config_path = dir.path().join("folio.toml");

        assert!(run(&config_path, Some(Path::new(".")), None).is_err());
        assert!(run(&config_path, Some(dir.path()), None).is_err());
        assert!(run(&config_path, Some(&dir.path().join("src")), None).is_err());

        assert!(config_path.exists());
        assert!(dir.path().join("src/pages/index.html").exists());
    }

    #[test]
    fn test_build_command_missing_config() {
        let dir = TempDir::new().unwrap();
        let err = run(&dir.path().join("folio.toml"), None, None).unwrap_err();
        assert!(err.to_string().contains("folio init"));
    }
}
