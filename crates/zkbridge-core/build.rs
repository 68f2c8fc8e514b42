use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=ZKBRIDGE_GNARK_LIB_DIR");
    println!("cargo:rerun-if-changed=build.rs");

    // Without `link` the native engine is never referenced, so nothing to do.
    if env::var_os("CARGO_FEATURE_LINK").is_none() {
        return;
    }

    if let Some(dir) = env::var_os("ZKBRIDGE_GNARK_LIB_DIR") {
        let dir = PathBuf::from(dir);
        if dir.exists() {
            println!("cargo:rustc-link-search=native={}", dir.display());
        } else {
            println!(
                "cargo:warning=ZKBRIDGE_GNARK_LIB_DIR={} does not exist, relying on the system search path",
                dir.display()
            );
        }
    }

    // Shipped as `libgnarkprover.so` (Android) or `libgnarkprover.dylib` /
    // framework (iOS); both are loaded dynamically by the host app.
    println!("cargo:rustc-link-lib=dylib=gnarkprover");
}
