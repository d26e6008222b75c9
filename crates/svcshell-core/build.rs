//! Records the workspace root so binaries can tell whether they run from it.

use std::env;
use std::path::PathBuf;

fn main() {
    // crates/svcshell-core -> workspace root
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let repo_root = manifest_dir
        .ancestors()
        .nth(2)
        .map_or_else(|| manifest_dir.clone(), std::path::Path::to_path_buf);

    println!("cargo:rustc-env=SVCSHELL_REPO_ROOT={}", repo_root.display());
    println!("cargo:rerun-if-changed=build.rs");
}
