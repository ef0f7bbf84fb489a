// `katalon-launcher version`: print the version this binary was built from.

pub fn run() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}
