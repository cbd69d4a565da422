use super::normalize::normalize_draft;
use super::{find_drafts, read_draft};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use obojobo_editor::Registry;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct RoundtripArgs {
    /// Draft file or directory of drafts
    pub input: PathBuf,
}

/// Outcome of converting one draft to the editable tree and back
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    /// The converted draft matches the normalized input
    Stable { repaired: usize },
    Differs(String),
}

pub fn roundtrip(args: RoundtripArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = Registry::new();
    let drafts = find_drafts(&args.input)?;
    let mut failures = 0;

    for draft in &drafts {
        match roundtrip_file(draft, &registry, &config) {
            Ok(Outcome::Stable { repaired: 0 }) => println!("{} {}", "✓".green(), draft.display()),
            Ok(Outcome::Stable { repaired }) => println!(
                "{} {} {}",
                "✓".green(),
                draft.display(),
                format!("(after {} repairs)", repaired).dimmed()
            ),
            Ok(Outcome::Differs(difference)) => {
                failures += 1;
                println!("{} {}", "✗".red(), draft.display());
                println!("  {}", difference);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} {} - {}", "✗".red(), draft.display(), e.to_string().red());
            }
        }
    }

    println!();
    if failures == 0 {
        println!("{} {} drafts round-trip cleanly", "✅".green(), drafts.len());
        Ok(())
    } else {
        println!("{} {} of {} drafts changed", "⚠️".yellow(), failures, drafts.len());
        std::process::exit(1);
    }
}

fn roundtrip_file(path: &Path, registry: &Registry, config: &Config) -> Result<Outcome> {
    let mut ids = config.id_strategy.generator(&path.display().to_string());
    let node = read_draft(path, ids.as_mut())?;
    let normalized = normalize_draft(&node, registry, config.max_repair_passes, ids.as_mut())?;

    let back = registry.slate_to_obo(&registry.obo_to_slate(&normalized.node)?)?;
    Ok(match first_difference(&normalized.node.to_value(), &back.to_value(), "") {
        None => Outcome::Stable {
            repaired: normalized.violations,
        },
        Some(difference) => Outcome::Differs(difference),
    })
}

/// First place two JSON trees disagree, as `pointer: expected != actual`
pub(crate) fn first_difference(expected: &Value, actual: &Value, pointer: &str) -> Option<String> {
    match (expected, actual) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, value) in a {
                let child = format!("{}/{}", pointer, key);
                match b.get(key) {
                    Some(other) => {
                        if let Some(found) = first_difference(value, other, &child) {
                            return Some(found);
                        }
                    }
                    None => return Some(format!("{}: {} != (missing)", child, value)),
                }
            }
            b.iter()
                .find(|(key, _)| !a.contains_key(*key))
                .map(|(key, value)| format!("{}/{}: (missing) != {}", pointer, key, value))
        }
        (Value::Array(a), Value::Array(b)) => {
            for (i, (x, y)) in a.iter().zip(b).enumerate() {
                if let Some(found) = first_difference(x, y, &format!("{}/{}", pointer, i)) {
                    return Some(found);
                }
            }
            (a.len() != b.len()).then(|| format!("{}: {} items != {} items", pointer, a.len(), b.len()))
        }
        (a, b) if a == b => None,
        (a, b) => Some(format!("{}: {} != {}", if pointer.is_empty() { "/" } else { pointer }, a, b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_first_difference() {
        let a = json!({"id": "t", "content": {"textGroup": [{"text": {"value": "Hi"}}]}});
        assert_eq!(first_difference(&a, &a.clone(), ""), None);

        let b = json!({"id": "t", "content": {"textGroup": [{"text": {"value": "Ho"}}]}});
        assert_eq!(
            first_difference(&a, &b, ""),
            Some("/content/textGroup/0/text/value: \"Hi\" != \"Ho\"".to_string())
        );

        let c = json!({"id": "t", "content": {"textGroup": []}});
        assert_eq!(
            first_difference(&a, &c, ""),
            Some("/content/textGroup: 1 items != 0 items".to_string())
        );

        let d = json!({"id": "t", "content": {"textGroup": [{"text": {"value": "Hi"}}]}, "extra": 1});
        assert_eq!(first_difference(&a, &d, ""), Some("/extra: (missing) != 1".to_string()));
    }

    #[test]
    fn test_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.xml");
        fs::write(&path, r#"<Page id="p"><Text id="t"><t>Hello <b>world</b></t></Text></Page>"#).unwrap();

        let outcome = roundtrip_file(&path, &Registry::new(), &Config::default()).unwrap();
        assert_eq!(outcome, Outcome::Stable { repaired: 0 });
    }
}
