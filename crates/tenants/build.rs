use std::fs;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::Shell;

// cli.rs only depends on clap + clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo");
    let out_dir = Path::new(&out_dir);

    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");
    let completions_dir = out_dir.join("completions");
    fs::create_dir_all(&completions_dir).expect("failed to create completions directory");

    let mut cmd = cli::Cli::command();
    render_manpages(&cmd, &man_dir);

    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
        clap_complete::generate_to(shell, &mut cmd, "tenants", &completions_dir)
            .unwrap_or_else(|e| panic!("failed to generate {shell} completions: {e}"));
    }
}

/// Write `<name>.1` for the command and one page per visible subcommand.
fn render_manpages(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();

    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut buf)
        .unwrap_or_else(|e| panic!("failed to render man page for `{name}`: {e}"));
    let path = dir.join(format!("{name}.1"));
    fs::write(&path, buf).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        render_manpages(&sub, dir);
    }
}
