//! End-to-end dispatcher tests against real language runtimes
//!
//! Each test skips quietly when its interpreter is not installed on the
//! host; the sandbox crate's unit tests cover the pipeline itself with
//! /bin/sh and need no toolchain.

use crate::common::{dispatcher_for, has_interpreter, setup_test_logging};
use polyrun_common::{ExecutionRequest, LanguageId, Outcome};
use polyrun_sandbox::ResourceLimits;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_python_hello_world() {
    setup_test_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::Python], ResourceLimits::default()).await;
    let result = dispatcher
        .execute(ExecutionRequest::new(
            LanguageId::Python,
            "print(\"hello world\")",
        ))
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(result.stdout, "hello world\n");
    assert!(result.stderr.is_empty());
}

#[tokio::test]
async fn test_javascript_hello_world() {
    setup_test_logging();
    if !has_interpreter("node") {
        eprintln!("skipping: node not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::JavaScript], ResourceLimits::default()).await;
    let result = dispatcher
        .execute(ExecutionRequest::new(
            LanguageId::JavaScript,
            "console.log(\"hello world\");",
        ))
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Success);
    assert_eq!(result.stdout, "hello world\n");
    assert!(result.stderr.is_empty());
}

#[tokio::test]
async fn test_java_hello_world() {
    setup_test_logging();
    if !has_interpreter("java") || !has_interpreter("javac") {
        eprintln!("skipping: java toolchain not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::Java], ResourceLimits::default()).await;
    let result = dispatcher
        .execute(ExecutionRequest::new(
            LanguageId::Java,
            r#"public class Hello {
    public static void main(String[] args) {
        System.out.println("hello world");
    }
}"#,
        ))
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Success, "stderr: {}", result.stderr);
    assert_eq!(result.stdout, "hello world\n");
}

#[tokio::test]
async fn test_java_compile_failure_never_runs() {
    setup_test_logging();
    if !has_interpreter("java") || !has_interpreter("javac") {
        eprintln!("skipping: java toolchain not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::Java], ResourceLimits::default()).await;
    let result = dispatcher
        .execute(ExecutionRequest::new(
            LanguageId::Java,
            "public class Broken { int x = }",
        ))
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::CompileFailure);
    assert!(!result.stderr.is_empty());
    assert!(result.stdout.is_empty());
}

#[tokio::test]
async fn test_python_runtime_failure_diagnostic() {
    setup_test_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::Python], ResourceLimits::default()).await;
    let result = dispatcher
        .execute(ExecutionRequest::new(LanguageId::Python, "1/0"))
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::RuntimeFailure);
    assert!(result.stderr.contains("ZeroDivisionError"));
    assert_ne!(result.exit_code, Some(0));
}

#[tokio::test]
async fn test_unregistered_language_spawns_nothing() {
    setup_test_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::Python], ResourceLimits::default()).await;
    let started = Instant::now();
    let result = dispatcher
        .execute(ExecutionRequest::new(LanguageId::Java, "anything"))
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::UnsupportedLanguage);
    assert_eq!(result.exit_code, None);
    assert_eq!(result.duration_millis, 0);
    // No process, no scratch dir: the rejection is immediate.
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_infinite_loop_times_out_within_bound() {
    setup_test_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::Python], ResourceLimits::default()).await;
    let timeout = Duration::from_secs(1);
    let started = Instant::now();
    let result = dispatcher
        .execute(
            ExecutionRequest::new(LanguageId::Python, "while True:\n    pass")
                .with_timeout(timeout),
        )
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::TimeoutFailure);
    // Deadline plus bounded overhead, not unbounded waiting.
    assert!(started.elapsed() < timeout + Duration::from_secs(4));
}

#[tokio::test]
async fn test_output_cap_flags_truncation() {
    setup_test_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return;
    }
    let mut limits = ResourceLimits::default();
    limits.max_output_bytes = 16 * 1024;
    let dispatcher = dispatcher_for(&[LanguageId::Python], limits).await;
    let result = dispatcher
        .execute(ExecutionRequest::new(
            LanguageId::Python,
            "while True:\n    print(\"x\" * 1024)",
        ))
        .await
        .unwrap();
    assert!(result.truncated);
    assert!(result.stdout.len() <= 16 * 1024);
}

#[tokio::test]
async fn test_concurrent_slow_and_quick_requests() {
    setup_test_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return;
    }
    let dispatcher = Arc::new(dispatcher_for(&[LanguageId::Python], ResourceLimits::default()).await);

    let slow = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .execute(
                    ExecutionRequest::new(LanguageId::Python, "while True:\n    pass")
                        .with_timeout(Duration::from_secs(3)),
                )
                .await
                .unwrap()
        })
    };
    // Give the slow request a head start on its slot.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    let quick = dispatcher
        .execute(ExecutionRequest::new(LanguageId::Python, "print(1+1)"))
        .await
        .unwrap();
    let quick_elapsed = started.elapsed();

    assert_eq!(quick.outcome, Outcome::Success);
    assert_eq!(quick.stdout, "2\n");
    // The quick result arrives without waiting out the slow timeout.
    assert!(quick_elapsed < Duration::from_secs(3));

    let slow = slow.await.unwrap();
    assert_eq!(slow.outcome, Outcome::TimeoutFailure);
}

#[tokio::test]
async fn test_deterministic_source_is_idempotent() {
    setup_test_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::Python], ResourceLimits::default()).await;
    let request = ExecutionRequest::new(LanguageId::Python, "print(sum(range(10)))");
    let first = dispatcher.execute(request.clone()).await.unwrap();
    let second = dispatcher.execute(request).await.unwrap();
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.stdout, "45\n");
}

#[tokio::test]
async fn test_inputs_feed_stdin_in_order() {
    setup_test_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return;
    }
    let dispatcher = dispatcher_for(&[LanguageId::Python], ResourceLimits::default()).await;
    let result = dispatcher
        .execute(
            ExecutionRequest::new(
                LanguageId::Python,
                "a = input()\nb = input()\nprint(a + \"-\" + b)",
            )
            .with_input("first")
            .with_input("second"),
        )
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Success, "stderr: {}", result.stderr);
    assert_eq!(result.stdout, "first-second\n");
}
