use std::path::Path;

use indoc::indoc;

pub const CONFIG_FILE: &str = "locsmith.toml";

const STARTER_CONFIG: &str = indoc! {r#"
    [locale]
    source = "en"
    targets = ["fr", "de"]

    [files.json]
    include = ["locales/[locale].json"]

    [model]
    provider = "openai"
    model = "gpt-4o-mini"
    temperature = 0.0

    # Extra guidance appended to every translation prompt.
    # instructions = "Use informal address."
"#};

/// Run the init command: write a starter config unless one already exists.
pub fn run() -> i32 {
    if Path::new(CONFIG_FILE).exists() {
        eprintln!("{} already exists, leaving it untouched", CONFIG_FILE);
        return 1;
    }

    if let Err(e) = std::fs::write(CONFIG_FILE, STARTER_CONFIG) {
        eprintln!("Error writing {}: {}", CONFIG_FILE, e);
        return 1;
    }

    println!("✓ Wrote {}", CONFIG_FILE);
    println!("Edit the locale targets and file patterns, then run `locsmith translate`.");
    0
}
