//! Build script for the storefront crate.
//!
//! Generates a content-based hash for the stylesheet so it can be
//! served with immutable cache headers and busted on change.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_css();
}

/// Hash main.css and expose the digest as `CSS_HASH` for
/// `env!("CSS_HASH")`.
fn hash_css() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = match fs::read(&css_path) {
        Ok(content) => content,
        Err(e) => {
            // CSS might not exist yet during initial build
            println!("cargo:warning=Could not read main.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
            return;
        }
    };

    let mut hasher = Sha256::new();
    hasher.update(&content);
    let digest = hasher.finalize();
    let hash: String = digest
        .iter()
        .take(4)
        .map(|b| format!("{b:02x}"))
        .collect();

    println!("cargo:rustc-env=CSS_HASH={hash}");
}
