//! Dropout predictor entrypoint: reads one JSON request from stdin, writes one JSON response
//! to stdout. Logs go to stderr.

use dropout_predictor::{
    config::ServiceConfig, logging::StructuredLogger, protocol::handle_request,
    service::PredictionService,
};
use std::io::{Read, Write};
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let loaded = ServiceConfig::load(&ServiceConfig::default_path());
    let config = loaded.as_ref().cloned().unwrap_or_default();

    StructuredLogger::init(config.log.json, &config.log.level);
    if let Err(e) = &loaded {
        warn!(error = %e, "using default config");
    }

    let model_path = config.model.resolved_model_path();
    info!(model_path = %model_path.display(), "dropout predictor starting");

    let mut service = PredictionService::new(config);
    service.load_model();

    let mut input = String::new();
    let response = match std::io::stdin().read_to_string(&mut input) {
        Ok(_) => handle_request(&mut service, &input),
        Err(e) => dropout_predictor::Response::service_error(&e.into()),
    };

    let text = response.render()?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    stdout.flush()?;
    Ok(())
}
