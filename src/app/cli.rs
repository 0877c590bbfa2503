use std::future::Future;

use tracing::Level;

use super::error::AppError;

/// Reusable CLI application runner that handles:
/// - Argument parsing with a usage error on failure
/// - Log output to stderr, keeping stdout for data
/// - Signal handling (SIGINT, SIGTERM, SIGHUP)
/// - Exit codes (0 = success, 1 = error, 2 = bad arguments, 130 = SIGINT, 143 = SIGTERM)
pub struct CliApp {
    name: String,
    log_level: Level,
}

impl CliApp {
    /// Create a new CLI application runner
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log_level: Level::WARN,
        }
    }

    /// Most verbose level written to stderr
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    pub fn log_level(&self) -> Level {
        self.log_level
    }

    /// Run the CLI application with proper signal handling and resource cleanup
    ///
    /// Creates a buffered stdout writer and passes it to the main function
    /// together with the parsed arguments. The main function must flush the
    /// writer before returning.
    ///
    /// This function never returns - it calls std::process::exit with the appropriate code
    pub async fn run<A, P, F, Fut>(self, parse_args: P, main_fn: F) -> !
    where
        P: FnOnce(Vec<String>) -> Result<A, AppError>,
        F: FnOnce(tokio::io::BufWriter<tokio::io::Stdout>, A) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        // Data goes to stdout, so logs go to stderr
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(self.log_level)
            .try_init();

        let args = std::env::args().collect();
        let code = self.execute(args, parse_args, main_fn).await;
        std::process::exit(code);
    }

    /// Run to completion and return the exit code instead of exiting
    pub async fn execute<A, P, F, Fut>(&self, args: Vec<String>, parse_args: P, main_fn: F) -> i32
    where
        P: FnOnce(Vec<String>) -> Result<A, AppError>,
        F: FnOnce(tokio::io::BufWriter<tokio::io::Stdout>, A) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let args = match parse_args(args) {
            Ok(args) => args,
            Err(e) => {
                eprintln!("{}: {}", self.name, e);
                return 2;
            }
        };

        let writer = tokio::io::BufWriter::new(tokio::io::stdout());

        // Race main application logic against signal reception. On a signal
        // the main future is dropped, so an open window is never committed.
        tokio::select! {
            result = main_fn(writer, args) => match result {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("{}: {}", self.name, e);
                    1
                }
            },
            signal_code = self.wait_for_signal() => signal_code,
        }
    }

    /// Wait for any Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C
    /// Returns the exit code to use (130 for SIGINT, 143 for SIGTERM, etc.)
    async fn wait_for_signal(&self) -> i32 {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
            let mut sighup = signal(SignalKind::hangup()).expect("Failed to setup SIGHUP handler");

            tokio::select! {
                _ = sigterm.recv() => {
                    eprintln!("Received SIGTERM");
                    143 // 128 + 15
                }
                _ = sigint.recv() => {
                    eprintln!("Received SIGINT");
                    130 // 128 + 2
                }
                _ = sighup.recv() => {
                    eprintln!("Received SIGHUP");
                    129 // 128 + 1
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to setup Ctrl+C handler");
            eprintln!("Received Ctrl+C");
            130
        }
    }
}
