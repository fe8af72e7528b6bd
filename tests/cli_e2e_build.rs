//! End-to-end tests for the default `xmake` (build) command.
//!
//! Every test builds a scratch repository and runs the real binary against a
//! fake toolchain, so no compiler is needed.

#![cfg(unix)]

mod common;
use common::prelude::*;

const CORE_RULES: &str = r#"
core:
  srcs: [core.cc, detail/impl.cc]
  hdrs: [core.h]
  deps: []
"#;

const APP_RULES: &str = r#"
main:
  main: true
  srcs: [main.cc]
  deps: ["//lib:core"]
"#;

fn library_and_app() -> TestRepo {
    let repo = TestRepo::new();
    repo.rules("lib", CORE_RULES);
    repo.source("lib", "core.cc");
    repo.source("lib", "detail/impl.cc");
    repo.rules("app", APP_RULES);
    repo.source("app", "main.cc");
    repo
}

fn position(commands: &[String], needle: &str) -> usize {
    commands
        .iter()
        .position(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("no command containing {:?} in {:#?}", needle, commands))
}

/// A bare invocation builds the dependency closure of the current directory.
#[test]
fn test_build_library_and_executable() {
    let repo = library_and_app();

    repo.xmake_in("app")
        .assert()
        .success()
        .stdout(predicate::str::contains("Built 2 target(s)"))
        .stderr(predicate::str::contains("[Loading] //app"))
        .stderr(predicate::str::contains("[Loading] //lib"))
        .stderr(predicate::str::contains("[Doing] //lib:core"))
        .stderr(predicate::str::contains("[Doing] //app:main"));

    repo.temp
        .child("lib/.out/core.a")
        .assert(predicate::path::exists());
    repo.temp
        .child("lib/.out/.objs/core/core.o")
        .assert(predicate::path::exists());
    repo.temp
        .child("lib/.out/.objs/core/detail/impl.o")
        .assert(predicate::path::exists());
    repo.temp
        .child("app/.out/main")
        .assert(predicate::path::exists());
}

/// The library is archived before the executable links against it.
#[test]
fn test_build_order_and_command_lines() {
    let repo = library_and_app();

    repo.xmake_in("app").assert().success();

    let commands = repo.commands();
    let archive = position(&commands, "ar rcs");
    let link = position(&commands, "-pthread");
    assert!(archive < link, "archive must precede link: {:#?}", commands);

    let compile = &commands[position(&commands, "core.cc")];
    assert!(compile.contains("-O3 -std=c++20"));
    let root = repo.path("").canonicalize().unwrap();
    assert!(compile.contains(&format!("-I{}", root.display())));
    assert!(compile.contains(" -c "));

    let link_line = &commands[link];
    assert!(link_line.contains("main.o"));
    assert!(link_line.contains("core.a"));
}

/// An executable links the archives of indirect library dependencies too.
#[test]
fn test_build_links_transitive_archives() {
    let repo = TestRepo::new();
    repo.rules("base", "util:\n  srcs: [util.cc]\n  deps: []\n");
    repo.rules("lib", "core:\n  srcs: [core.cc]\n  deps: [\"//base:util\"]\n");
    repo.rules(
        "app",
        "main:\n  main: true\n  srcs: [main.cc]\n  deps: [\"//lib:core\"]\n",
    );

    repo.xmake_in("app").assert().success();

    let commands = repo.commands();
    let link_line = &commands[position(&commands, "-pthread")];
    let core = link_line.find("core.a").unwrap();
    let util = link_line.find("util.a").unwrap();
    assert!(core < util, "dependents must come first: {}", link_line);
}

/// Bare names resolve inside the referencing directory.
#[test]
fn test_build_local_dependency() {
    let repo = TestRepo::new();
    repo.rules(
        "",
        "core:\n  srcs: [core.cc]\n  deps: []\ntool:\n  main: \"true\"\n  srcs: [tool.cc]\n  deps: [core]\n",
    );

    repo.xmake_in("").assert().success();

    repo.temp
        .child(".out/core.a")
        .assert(predicate::path::exists());
    repo.temp
        .child(".out/tool")
        .assert(predicate::path::exists());
}

/// The `build` subcommand behaves like a bare invocation, including `--jobs`.
#[test]
fn test_build_subcommand_with_jobs() {
    let repo = library_and_app();

    repo.xmake_in("app")
        .args(["build", "--jobs", "4"])
        .assert()
        .success();

    let commands = repo.commands();
    assert!(position(&commands, "ar rcs") < position(&commands, "-pthread"));
}

/// `--quiet` drops the header and summary but keeps the build going.
#[test]
fn test_build_quiet() {
    let repo = library_and_app();

    repo.xmake_in("app")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    repo.temp
        .child("app/.out/main")
        .assert(predicate::path::exists());
}

/// Source globs expand to the matching files, in sorted order.
#[test]
fn test_build_source_glob() {
    let repo = TestRepo::new();
    repo.rules("lib", "core:\n  srcs: [\"*.cc\"]\n  deps: []\n");
    repo.source("lib", "b.cc");
    repo.source("lib", "a.cc");

    repo.xmake_in("lib").assert().success();

    let commands = repo.commands();
    assert!(position(&commands, "a.cc") < position(&commands, "b.cc"));
    repo.temp
        .child("lib/.out/.objs/core/a.o")
        .assert(predicate::path::exists());
}

/// Sibling targets compiling same-stem sources in parallel each archive
/// their own object.
#[test]
fn test_build_parallel_siblings_with_same_stem() {
    let repo = TestRepo::new();
    repo.rules(
        "lib",
        "x:\n  srcs: [a.cc]\n  deps: []\ny:\n  srcs: [a.c]\n  deps: []\n",
    );

    repo.xmake_in("lib").args(["--jobs", "2"]).assert().success();

    let commands = repo.commands();
    let x = &commands[position(&commands, "x.a")];
    let y = &commands[position(&commands, "y.a")];
    assert!(x.contains(".objs/x/a.o") && !x.contains(".objs/y/"), "{}", x);
    assert!(y.contains(".objs/y/a.o") && !y.contains(".objs/x/"), "{}", y);
}

/// Two sources that would compile to one object are rejected.
#[test]
fn test_build_rejects_sources_sharing_an_object() {
    let repo = TestRepo::new();
    repo.rules("lib", "core:\n  srcs: [a.cc, a.cpp]\n  deps: []\n");

    repo.xmake_in("lib")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("would both compile to"));
    assert!(repo.commands().is_empty());
}

/// Compiler output is surfaced together with the failing command line.
#[test]
fn test_build_compiler_failure() {
    let repo = library_and_app();

    repo.xmake_in("app")
        .env("XMAKE_CXX", repo.failing_cxx())
        .assert()
        .code(7)
        .stderr(predicate::str::contains("compile step failed for //lib:core"))
        .stderr(predicate::str::contains("command:"))
        .stderr(predicate::str::contains("error: expected unqualified-id"));

    repo.temp
        .child("app/.out/main")
        .assert(predicate::path::missing());
}

/// A compiler that cannot be started is a toolchain failure.
#[test]
fn test_build_missing_compiler() {
    let repo = library_and_app();

    repo.xmake_in("app")
        .env("XMAKE_CXX", repo.path("no-such-compiler"))
        .assert()
        .code(7)
        .stderr(predicate::str::contains("failed to start"));
}
