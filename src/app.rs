//! Main application orchestration and execution

use crate::{
    client::{Connection, TeardownStatus},
    config::display_config_summary,
    error::Result,
    executor::{BenchmarkExecutor, BenchmarkReport},
    logging::{Logger, LoggerFactory},
    models::Config,
    output::{ReportEmitter, ReporterFactory},
    values::ValueSource,
};

/// Result of one run together with how the connection was torn down
#[derive(Debug)]
pub struct RunOutcome {
    pub result: Result<BenchmarkReport>,
    pub teardown: TeardownStatus,
    /// Requests written to the peer before teardown
    pub requests_sent: u64,
}

impl RunOutcome {
    pub fn into_result(self) -> Result<BenchmarkReport> {
        self.result
    }
}

/// Coordinates one benchmark run: batch generation, connection, executor, teardown
pub struct App {
    config: Config,
    loggers: LoggerFactory,
}

impl App {
    /// The configuration is expected to be validated already
    pub fn new(config: Config) -> Self {
        Self {
            loggers: LoggerFactory::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run against the peer, reporting to stdout
    pub async fn run(&self) -> Result<BenchmarkReport> {
        let mut emitter = ReporterFactory::create(&self.config);
        self.run_with_emitter(emitter.as_mut()).await.into_result()
    }

    /// Run against the peer and close the connection on every path
    pub async fn run_with_emitter(&self, emitter: &mut dyn ReportEmitter) -> RunOutcome {
        let logger = self.loggers.create_logger("APP").await;

        if self.config.debug {
            logger.debug("Configuration loaded")
                .field("session_id", self.loggers.session_id())
                .field("summary", display_config_summary(&self.config))
                .log()
                .await;
        }

        let endpoint = match self.config.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                return RunOutcome { result: Err(e), teardown: TeardownStatus::NeverConnected, requests_sent: 0 };
            }
        };

        let batch = match ValueSource::new(self.config.seed).generate(self.config.num_values) {
            Ok(batch) => batch,
            Err(e) => {
                return RunOutcome { result: Err(e), teardown: TeardownStatus::NeverConnected, requests_sent: 0 };
            }
        };

        let mut connection = Connection::open(
            endpoint.clone(),
            self.config.connection_options(),
            self.loggers.create_logger("CONN").await,
        );

        let executor = BenchmarkExecutor::new(self.loggers.create_logger("BENCH").await)
            .with_order_verification(self.config.verbose);

        let result = executor.execute(&mut connection, &endpoint, &batch, emitter).await;
        if let Err(ref e) = result {
            logger.error("Benchmark run failed")
                .error_info(e)
                .log()
                .await;
        }

        let requests_sent = connection.requests_sent();
        let teardown = connection.close(self.config.shutdown_timeout()).await;
        log_teardown(&logger, teardown).await;

        RunOutcome { result, teardown, requests_sent }
    }
}

async fn log_teardown(logger: &Logger, teardown: TeardownStatus) {
    match teardown {
        TeardownStatus::TimedOut | TeardownStatus::Aborted => {
            logger.warn("Connection did not close cleanly")
                .field("teardown", format!("{:?}", teardown))
                .log()
                .await;
        }
        _ => {
            logger.debug("Connection closed")
                .field("teardown", format!("{:?}", teardown))
                .log()
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::output::PlainReporter;

    fn config_for(port: u16) -> Config {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: port,
            num_values: 16,
            enable_color: false,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_peer_never_sends_sort() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let app = App::new(config_for(port));
        let mut reporter = PlainReporter::new(Vec::new(), false);
        let outcome = app.run_with_emitter(&mut reporter).await;

        assert!(matches!(outcome.result, Err(AppError::Connectivity(_))));
        assert_eq!(outcome.requests_sent, 0);
        assert_eq!(outcome.teardown, TeardownStatus::NeverConnected);

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.starts_with("Pinging 127.0.0.1:"));
        assert!(!output.contains("Requesting server to sort array"));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_rejected_before_connecting() {
        let mut config = config_for(9000);
        config.server_host = String::new();

        let app = App::new(config);
        let mut reporter = PlainReporter::new(Vec::new(), false);
        let outcome = app.run_with_emitter(&mut reporter).await;

        assert!(matches!(outcome.result, Err(AppError::Validation(_))));
        assert!(reporter.into_inner().is_empty());
    }
}
