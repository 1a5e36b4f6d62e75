//! Init command - scaffold a project with the canonical configuration

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr, bail};
use folio_core::{Config, DesignTokens};

const CONFIG_FILE: &str = "folio.toml";
const TOKENS_FILE: &str = "tokens.toml";

const STARTER_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Home</title>
</head>
<body class="bg-background text-text font-sans leading-relaxed">
<main class="max-w-content">
<h1 class="text-accent hover:text-accent-hover">Hello</h1>
</main>
</body>
</html>
"#;

/// Run the init command.
///
/// Writes `folio.toml` pointing at a `tokens.toml` holding the canonical
/// design tokens, plus a starter page. Existing files are never overwritten.
pub fn run(dir: &Path) -> Result<()> {
    tracing::info!(?dir, "Initializing project");

    let config_path = dir.join(CONFIG_FILE);
    let tokens_path = dir.join(TOKENS_FILE);
    for path in [&config_path, &tokens_path] {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
    }

    fs::create_dir_all(dir).wrap_err("Failed to create project directory")?;

    let mut config = Config::canonical();
    config.theme.tokens = vec![TOKENS_FILE.into()];
    fs::write(&config_path, config.to_toml_string()?).wrap_err("Failed to write folio.toml")?;
    println!("Created: {}", config_path.display());

    fs::write(&tokens_path, DesignTokens::canonical().to_toml_string()?)
        .wrap_err("Failed to write tokens.toml")?;
    println!("Created: {}", tokens_path.display());

    let index = dir.join(&config.build.pages_dir).join("index.html");
    if !index.exists() {
        if let Some(parent) = index.parent() {
            fs::create_dir_all(parent).wrap_err("Failed to create pages directory")?;
        }
        fs::write(&index, STARTER_PAGE).wrap_err("Failed to write starter page")?;
        println!("Created: {}", index.display());
    }

    tracing::info!(?config_path, ?tokens_path, "Project initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_init_writes_canonical_files() {
        let dir = TempDir::new().unwrap();
        run(dir.path()).unwrap();

        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.site.origin, "https://akpandeya.com");

        let tokens = config.theme.resolve_tokens(dir.path()).unwrap();
        assert_eq!(tokens, DesignTokens::canonical());
        assert!(dir.path().join("src/pages/index.html").exists());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "# mine").unwrap();

        assert!(run(dir.path()).is_err());
        let kept = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(kept, "# mine");
    }

    #[test]
    fn test_init_then_build() {
        let dir = TempDir::new().unwrap();
        run(dir.path()).unwrap();

        let stats = crate::cmd::build::run(&dir.path().join(CONFIG_FILE), None, None).unwrap();
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.utilities, 7);
        assert!(stats.inlined);
    }
}
