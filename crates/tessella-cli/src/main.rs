use std::{env, fs, path::Path, process};

use anyhow::{Context, Result};
use tessella_engine::{
    Document, MarkupMode, Registry, SanitizePolicy, sanitize::sanitize_to_string,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("import") if args.len() == 2 => import(Path::new(&args[1])),
        Some("export") if args.len() == 2 => export(Path::new(&args[1])),
        Some("sanitize") if args.len() == 2 || args.len() == 4 => {
            let policy = match args.get(2).map(String::as_str) {
                Some("--policy") => load_policy(Path::new(&args[3]))?,
                Some(other) => {
                    eprintln!("unknown option: {other}");
                    usage();
                    process::exit(2);
                }
                None => SanitizePolicy::default(),
            };
            sanitize_file(Path::new(&args[1]), &policy)
        }
        _ => {
            usage();
            process::exit(2);
        }
    }
}

fn usage() {
    eprintln!("Usage:");
    eprintln!("  tessella import <file>                      load markup, print a block summary");
    eprintln!("  tessella export <file>                      load markup, print canonical form");
    eprintln!("  tessella sanitize <file> [--policy <toml>]  clean untrusted markup");
}

/// Load a markup file and print one line per classified block.
fn import(path: &Path) -> Result<()> {
    let markup = read(path)?;
    let registry = Registry::with_builtins();
    let doc = Document::from_markup(&markup, &registry);
    for (index, block) in doc.iter().enumerate() {
        let preview = block.payload.primary_text().unwrap_or_default();
        let preview: String = preview.chars().take(48).collect();
        println!("{index:>3}  {:<10} {preview}", block.payload.type_tag());
    }
    Ok(())
}

/// Re-serialize a markup file into its canonical external form.
fn export(path: &Path) -> Result<()> {
    let markup = read(path)?;
    let registry = Registry::with_builtins();
    let doc = Document::from_markup(&markup, &registry);
    println!("{}", doc.to_markup(MarkupMode::External));
    Ok(())
}

/// Run the sanitization pipeline over an untrusted markup file.
fn sanitize_file(path: &Path, policy: &SanitizePolicy) -> Result<()> {
    let markup = read(path)?;
    println!("{}", sanitize_to_string(&markup, policy));
    Ok(())
}

fn load_policy(path: &Path) -> Result<SanitizePolicy> {
    let content = read(path)?;
    toml::from_str(&content).with_context(|| format!("failed to parse policy file {path:?}"))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn policy_file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 4").unwrap();
        let policy = load_policy(file.path()).unwrap();
        assert_eq!(policy.max_depth, 4);
        assert!(policy.is_allowed_tag("p"));
    }

    #[test]
    fn unreadable_policy_path_is_a_context_error() {
        let err = load_policy(Path::new("/nonexistent/policy.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
