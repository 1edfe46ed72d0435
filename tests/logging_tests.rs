use myenovos::config::LoggingConfig;
use myenovos::logging::{LogContext, get_logger_with_context, init_logging, parse_log_level};
use tracing::Level;

#[test]
fn parse_levels_case_insensitively() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("WARNING").unwrap(), Level::WARN);
    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn file_logging_initializes_once() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let config = LoggingConfig {
        level: "DEBUG".to_string(),
        file: Some(tmp_dir.path().join("myenovos.log").to_string_lossy().to_string()),
        backup_count: 2,
        console_output: false,
        json_format: true,
    };

    init_logging(&config).unwrap();
    // a second call is a no-op
    init_logging(&config).unwrap();

    let logger = get_logger_with_context(LogContext::new("test").with_customer("4711"));
    logger.info("hello from the integration test");
}
