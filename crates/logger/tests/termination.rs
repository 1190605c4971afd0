//! Fatal and panic records

use proven_logger::test_support::CaptureSink;
use proven_logger::*;

use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

#[test]
fn test_fatal_reaches_files_before_exit() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("app.log");
    let err_path = dir.path().join("app.err");

    // What each file held at the moment the exit handler ran
    let seen = Arc::new(Mutex::new(None));
    let handler_seen = Arc::clone(&seen);
    let (handler_log, handler_err) = (log_path.clone(), err_path.clone());

    let logger = Logger::builder(
        Config::default()
            .with_log_file(&log_path)
            .with_err_file(&err_path),
    )
    .exit_handler(move |code| {
        *handler_seen.lock() = Some((
            code,
            fs::read_to_string(&handler_log).unwrap(),
            fs::read_to_string(&handler_err).unwrap(),
        ));
    })
    .build()
    .unwrap();

    logger.with_field("reason", "corrupt-state").fatal("shutting down");

    let (code, log, err) = seen.lock().take().unwrap();
    assert_eq!(code, FATAL_EXIT_CODE);
    assert!(log.contains("[FATA] shutting down reason=corrupt-state"));
    assert!(err.contains("[FATA] shutting down reason=corrupt-state"));
}

#[test]
fn test_fatal_with_full_labels() {
    let capture = CaptureSink::new();
    let exits = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&exits);

    let logger = Logger::builder(Config::default().with_show_full_level(true))
        .console(Arc::new(capture.clone()))
        .exit_handler(move |code| recorded.lock().push(code))
        .build()
        .unwrap();

    logger.fatal("first");
    logger.log(Level::Fatal, "second");

    assert_eq!(*exits.lock(), [FATAL_EXIT_CODE, FATAL_EXIT_CODE]);
    assert_eq!(capture.lines().len(), 2);
    assert!(capture.contains("[FATAL] first"));
}

#[test]
#[should_panic(expected = "invariant violated")]
fn test_panic_unwinds_with_message() {
    let logger = Logger::builder(Config::default())
        .console(Arc::new(CaptureSink::new()))
        .build()
        .unwrap();

    logger.panic("invariant violated");
}

#[test]
fn test_panic_record_lands_in_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let logger = Logger::builder(Config::default().with_log_file(&path))
        .console(Arc::new(CaptureSink::new()))
        .build()
        .unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        logger.panic("gone");
    }));

    assert!(result.is_err());
    assert!(fs::read_to_string(&path).unwrap().contains("[PANI] gone"));
}
