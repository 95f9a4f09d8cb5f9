use std::process::Command;

fn main() {
    println!("cargo:rustc-env=VOTEWARDEN_GIT_HASH={}", git_short_hash());
    println!("cargo:rustc-env=VOTEWARDEN_BUILD_DATE={}", build_date());

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
}

fn git_short_hash() -> String {
    run("git", &["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string())
}

fn build_date() -> String {
    run("date", &["+%Y-%m-%d"]).unwrap_or_else(|| "unknown".to_string())
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
