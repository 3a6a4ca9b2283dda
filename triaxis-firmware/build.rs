//! Build script for triaxis-firmware
//!
//! Puts memory.x on the linker search path and adds the link scripts
//! that are not already supplied through RUSTFLAGS.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    setup_linker();
}

fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());

    let rustflags = env::var("CARGO_ENCODED_RUSTFLAGS").unwrap_or_default();
    for arg in ["-Tlink.x", "-Tlink-rp.x", "-Tdefmt.x", "--nmagic"] {
        if !rustflags.contains(arg) {
            println!("cargo:rustc-link-arg-bins={}", arg);
        }
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}
