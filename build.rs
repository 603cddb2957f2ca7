// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: manifest store root
fn store_arg() -> Arg {
    Arg::new("store")
        .short('s')
        .long("store")
        .value_name("DIR")
        .default_value(".")
        .help("Manifest store root directory")
}

fn build_cli() -> Command {
    Command::new("mirrorpak")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate oc-mirror image-set manifests from IBM Pak metadata and drive air-gapped mirroring")
        .subcommand_required(false)
        .arg(
            Arg::new("log_file")
                .long("log-file")
                .value_name("PATH")
                .global(true)
                .help("Write log output to a file instead of stderr"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert IBM Pak image lists into image-set manifests")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("PATH")
                        .help("Pak case directory or a single <name>-<version>-images.csv file [default: ~/.ibm-pak/data/cases]"),
                )
                .arg(store_arg())
                .arg(
                    Arg::new("arch")
                        .short('a')
                        .long("arch")
                        .value_name("ARCH")
                        .action(clap::ArgAction::Append)
                        .help("Architecture to generate manifests for (repeatable; default: amd64 ppc64le s390x)"),
                )
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .value_name("PATH")
                        .help("TOML file with per-package conversion rules"),
                )
                .arg(
                    Arg::new("archive_size")
                        .long("archive-size")
                        .value_name("GIB")
                        .default_value("2")
                        .help("archiveSize written into each manifest"),
                )
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(clap::ArgAction::SetTrue)
                        .help("Show what would be written without writing"),
                ),
        )
        .subcommand(
            Command::new("mirror")
                .about("Mirror one package's images with oc-mirror")
                .arg(Arg::new("package").required(true).help("Package name, e.g. ibm-sls"))
                .arg(Arg::new("version").required(true).help("Package version, e.g. 3.12.5"))
                .arg(store_arg())
                .arg(
                    Arg::new("arch")
                        .short('a')
                        .long("arch")
                        .default_value("amd64")
                        .help("Architecture to mirror"),
                )
                .arg(
                    Arg::new("mode")
                        .short('m')
                        .long("mode")
                        .required(true)
                        .value_parser(["m2m", "m2d", "d2m"])
                        .help("Transfer mode: mirror-to-mirror, mirror-to-disk, disk-to-mirror"),
                )
                .arg(
                    Arg::new("target_registry")
                        .short('t')
                        .long("target-registry")
                        .value_name("REGISTRY")
                        .help("Target registry for m2m and d2m, e.g. registry.example.com/mirror"),
                )
                .arg(
                    Arg::new("authfile")
                        .long("authfile")
                        .value_name("PATH")
                        .help("Registry auth file [default: ~/.ibm-mas/auth.json if present]"),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("PATH")
                        .help("Image-set manifest to mirror [default: resolved from the store]"),
                )
                .arg(
                    Arg::new("workspace")
                        .long("workspace")
                        .value_name("DIR")
                        .default_value("workspace")
                        .help("oc-mirror workspace root for m2m"),
                )
                .arg(
                    Arg::new("archive_dir")
                        .long("archive-dir")
                        .value_name("DIR")
                        .default_value("output-dir")
                        .help("Archive root for m2d and d2m"),
                )
                .arg(
                    Arg::new("oc_mirror_bin")
                        .long("oc-mirror-bin")
                        .value_name("PATH")
                        .default_value("oc-mirror")
                        .help("oc-mirror binary to invoke"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("mirrorpak.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
