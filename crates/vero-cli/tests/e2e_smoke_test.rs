use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use vero_cli::{Args, Command, run};

/// Collects all .vero files from a directory
fn collect_vero_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("vero")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos are at workspace root, relative to workspace not the crate
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn compile_args(input: &Path, output: &Path) -> Args {
    Args {
        command: Command::Compile {
            input: input.to_string_lossy().to_string(),
            output: output.to_string_lossy().to_string(),
            config: None,
        },
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    // Create a temporary directory for test outputs
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_vero_files(demos_dir());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_dir = temp_dir
            .path()
            .join(demo_path.file_stem().unwrap().to_string_lossy().as_ref());

        let args = compile_args(demo_path, &output_dir);

        if let Err(e) = run(&args) {
            failed_demos.push((demo_path.clone(), e));
            continue;
        }

        // Every successful compile must leave at least one .spec.ts behind
        let generated = fs::read_dir(&output_dir)
            .expect("Output directory was not created")
            .flatten()
            .filter(|entry| entry.path().to_string_lossy().ends_with(".spec.ts"))
            .count();
        assert!(
            generated > 0,
            "{} compiled but produced no test files",
            demo_path.display()
        );
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    // Create a temporary directory for test outputs
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_vero_files(demos_dir().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_dir = temp_dir.path().join(format!(
            "error_{}",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        let args = compile_args(demo_path, &output_dir);

        if run(&args).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}

#[test]
fn e2e_check_reports_errors_without_writing_files() {
    let broken = demos_dir().join("errors").join("undefined_page.vero");

    let args = Args {
        command: Command::Check {
            input: broken.to_string_lossy().to_string(),
        },
        log_level: "off".to_string(),
    };

    assert!(run(&args).is_err());
}

#[test]
fn e2e_check_accepts_valid_demo() {
    let demo = demos_dir().join("login.vero");

    let args = Args {
        command: Command::Check {
            input: demo.to_string_lossy().to_string(),
        },
        log_level: "off".to_string(),
    };

    assert!(run(&args).is_ok());
}

#[test]
fn e2e_compile_honors_config_file() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[transpile]\nnew_tab_timeout_ms = 1234\ntab_poll_interval_ms = 60\n",
    )
    .expect("Failed to write config");

    let input = demos_dir().join("tabs.vero");
    let output_dir = temp_dir.path().join("out");

    let args = Args {
        command: Command::Compile {
            input: input.to_string_lossy().to_string(),
            output: output_dir.to_string_lossy().to_string(),
            config: Some(config_path.to_string_lossy().to_string()),
        },
        log_level: "off".to_string(),
    };

    run(&args).expect("Compile with config failed");

    let generated = fs::read_to_string(output_dir.join("HelpCenter.spec.ts"))
        .expect("HelpCenter.spec.ts was not written");
    assert!(generated.contains("timeout: 1234"));
    assert!(generated.contains("waitForTimeout(60)"));
}
