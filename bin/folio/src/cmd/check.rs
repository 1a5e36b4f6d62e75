//! Check command - validate configuration and design tokens

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use folio_core::{Config, DesignTokens, TokenDiff};
use folio_generator::ContentScanner;

use super::project_root;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration, the resolved design tokens and, when
/// `against` is given, reports how the tokens diverge from another file.
pub fn run(config_path: &Path, strict: bool, against: Option<&Path>) -> Result<ValidationResult> {
    tracing::info!(?config_path, strict, ?against, "Checking configuration and tokens");

    let mut result = ValidationResult::default();
    let root = project_root(config_path);

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    if let Some(ref cfg) = config {
        println!("\nChecking project layout...");
        check_layout(cfg, &root, &mut result);

        println!("\nChecking design tokens...");
        if let Some(tokens) = check_tokens(cfg, &root, &mut result)
            && let Some(other_path) = against
        {
            println!("\nComparing against {}...", other_path.display());
            compare_tokens(&tokens, other_path, &mut result);
        }
    }

    // Print summary
    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(result)
}

/// Check directories and content globs.
fn check_layout(config: &Config, root: &Path, result: &mut ValidationResult) {
    let pages_dir = root.join(&config.build.pages_dir);
    if pages_dir.is_dir() {
        println!("  ✓ {} exists", config.build.pages_dir.display());
    } else {
        result.add_warning(format!(
            "Pages directory missing: {}",
            config.build.pages_dir.display()
        ));
        println!("  ⚠ {} missing", config.build.pages_dir.display());
    }

    let output = root.join(&config.build.output_dir);
    if output.exists() && !output.is_dir() {
        result.add_error(format!(
            "Output path exists but is not a directory: {}",
            config.build.output_dir.display()
        ));
    }

    if config.theme.content.is_empty() {
        result.add_warning("theme.content is empty; no utility classes will be generated");
    }

    match ContentScanner::new(root, config.theme.content.as_slice()) {
        Ok(scanner) => match scanner.scan() {
            Ok(scan) => println!(
                "  ✓ {} content files, {} class candidates",
                scan.files.len(),
                scan.candidates.len()
            ),
            Err(e) => result.add_error(format!("Content scan failed: {e}")),
        },
        Err(e) => result.add_error(format!("Invalid content glob: {e}")),
    }
}

/// Resolve the effective tokens and collect their warnings.
fn check_tokens(
    config: &Config,
    root: &Path,
    result: &mut ValidationResult,
) -> Option<DesignTokens> {
    let tokens = match config.theme.resolve_tokens(root) {
        Ok(tokens) => tokens,
        Err(e) => {
            result.add_error(format!("Token error: {e}"));
            println!("  ✗ Tokens invalid");
            return None;
        }
    };

    match tokens.validate() {
        Ok(warnings) => {
            for warning in warnings {
                result.add_warning(warning);
            }
        }
        Err(e) => {
            result.add_error(format!("Token error: {e}"));
            return None;
        }
    }

    if config.theme.tokens.is_empty() {
        println!("  ✓ Using canonical tokens ({} entries)", tokens.len());
    } else {
        println!(
            "  ✓ {} token file(s), {} entries, dark mode: {}",
            config.theme.tokens.len(),
            tokens.len(),
            tokens.dark_mode()
        );
    }

    Some(tokens)
}

/// Report divergence between the effective tokens and another file.
fn compare_tokens(tokens: &DesignTokens, other_path: &Path, result: &mut ValidationResult) {
    let other = match DesignTokens::load(other_path) {
        Ok(other) => other,
        Err(e) => {
            result.add_error(format!("Failed to load {}: {e}", other_path.display()));
            return;
        }
    };

    let diff = TokenDiff::between(tokens, &other);
    if diff.is_empty() {
        println!("  ✓ Token sets are identical");
    } else {
        print!("{diff}");
        result.add_error(format!(
            "Design tokens diverge from {}: {} left only, {} right only, {} changed",
            other_path.display(),
            diff.only_left.len(),
            diff.only_right.len(),
            diff.changed.len() + usize::from(diff.dark_mode.is_some())
        ));
    }
}
