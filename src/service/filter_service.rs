//! Request evaluation service for the `run` command.

use std::io::{self, Read, Write};
use std::process;

use anyhow::Result;
use tracing::{debug, error, info};

use crate::cli::Format;
use crate::config::Config;
use crate::domain::{Decision, FilterChain, FormParams};
use crate::service::adapter::FormatAdapter;

/// Service evaluating one request description against the filter chain.
pub struct FilterService {
    filter_chain: FilterChain,
    adapter: FormatAdapter,
}

impl FilterService {
    /// Create a new FilterService with the specified format.
    ///
    /// Fails when any configured filter cannot be built.
    pub fn new(config: &Config, format: Format) -> Result<Self> {
        let filter_chain = FilterChain::new(config)?;
        let adapter = FormatAdapter::new(format);
        Ok(Self {
            filter_chain,
            adapter,
        })
    }

    /// Read a request from stdin, write the decision to stdout and exit with
    /// the decision's exit code.
    pub fn run(&self) -> Result<()> {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;

        let stdout = io::stdout();
        let mut stdout = stdout.lock();

        if input.trim().is_empty() {
            error!("No input received from stdin");
            let output = self.adapter.format_error("No input received from stdin");
            writeln!(stdout, "{}", output)?;
            process::exit(self.adapter.error_exit_code());
        }

        let params = match self.adapter.parse_input(&input) {
            Ok(params) => params,
            Err(e) => {
                let error_msg = format!("Failed to parse input: {}", e);
                error!("{}", error_msg);
                let output = self.adapter.format_error(&error_msg);
                writeln!(stdout, "{}", output)?;
                process::exit(self.adapter.error_exit_code());
            }
        };

        let decision = self.process(&params);
        let exit_code = self.adapter.exit_code(&decision);

        let output = self.adapter.format_output(&decision)?;
        info!("Output: {}", output);
        writeln!(stdout, "{}", output)?;
        stdout.flush()?;

        process::exit(exit_code);
    }

    /// Evaluate request parameters and return the decision.
    pub fn process(&self, request: &FormParams) -> Decision {
        debug!(
            filters = self.filter_chain.len(),
            params = request.len(),
            "Evaluating request"
        );
        self.filter_chain.evaluate(request)
    }
}
