fn main() {
    // Build stamp and target triple for the startup log line and `--version`
    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);
    println!("cargo:rustc-env=BUILD_TARGET={}", target);
    println!("cargo:rerun-if-changed=build.rs");
}
