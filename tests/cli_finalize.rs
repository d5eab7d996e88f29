//! Integration tests for `drover finalize`: shared resource linking inside
//! a release, including convergence on re-run.

mod common;

use common::*;

#[test]
fn finalize_links_shared_resources_into_the_release() {
    let env = TestEnv::new();
    assert!(env.run(&["setup"]).success);
    let release = env.create_release("20240311083000");

    let result = env.run(&["finalize"]);
    assert!(
        result.success,
        "finalize failed:\n{}",
        result.combined_output()
    );

    assert_link(
        &release.join("sites/default/settings.php"),
        &env.deploy_path("shared/settings.php"),
    );
    assert_link(
        &release.join("sites/default/settings.local.php"),
        &env.deploy_path("shared/settings.local.php"),
    );
    assert_link(
        &release.join("sites/default/files"),
        &env.deploy_path("shared/files"),
    );
}

#[test]
fn finalize_replaces_files_shipped_in_the_release_tree() {
    let env = TestEnv::new();
    assert!(env.run(&["setup"]).success);
    let release = env.create_release("20240311083000");

    // The release's own source tree ships a settings file; the link must
    // replace it rather than fail.
    std::fs::create_dir_all(release.join("sites/default")).unwrap();
    std::fs::write(
        release.join("sites/default/settings.php"),
        "<?php // baked-in\n",
    )
    .unwrap();

    let result = env.run(&["finalize"]);
    assert!(
        result.success,
        "finalize failed:\n{}",
        result.combined_output()
    );
    assert_link(
        &release.join("sites/default/settings.php"),
        &env.deploy_path("shared/settings.php"),
    );
}

#[test]
fn finalize_rerun_is_idempotent() {
    let env = TestEnv::new();
    assert!(env.run(&["setup"]).success);
    let release = env.create_release("20240311083000");

    assert!(env.run(&["finalize"]).success);
    let second = env.run(&["finalize"]);
    assert!(
        second.success,
        "second finalize failed:\n{}",
        second.combined_output()
    );

    assert_link(
        &release.join("sites/default/files"),
        &env.deploy_path("shared/files"),
    );
}

#[test]
fn finalize_targets_the_latest_release() {
    let env = TestEnv::new();
    assert!(env.run(&["setup"]).success);
    let old = env.create_release("20240101000000");
    let new = env.create_release("20240311083000");

    assert!(env.run(&["finalize"]).success);

    assert!(new.join("sites/default/files").symlink_metadata().is_ok());
    assert!(old.join("sites/default/files").symlink_metadata().is_err());
}

#[test]
fn finalize_without_any_release_is_skipped() {
    let env = TestEnv::new();
    assert!(env.run(&["setup"]).success);

    // Condition-gated: no release yet, so the task filters itself out.
    let result = env.run(&["finalize"]);
    assert!(
        result.success,
        "finalize should skip, not fail:\n{}",
        result.combined_output()
    );
    assert!(result.stdout.contains("skipped"));
}

#[test]
fn finalize_respects_release_override_flag() {
    let env = TestEnv::new();
    assert!(env.run(&["setup"]).success);
    let old = env.create_release("20240101000000");
    env.create_release("20240311083000");

    let result = env.run(&["--release", old.to_str().unwrap(), "finalize"]);
    assert!(
        result.success,
        "finalize failed:\n{}",
        result.combined_output()
    );
    assert!(old.join("sites/default/files").symlink_metadata().is_ok());
}
