use std::sync::Arc;

use crate::cli::{ConfigArgs, RunArgs};
use crate::config_yaml;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

use sweepr_core::{ShutdownFlag, run_benchmark};

pub async fn run(args: RunArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);

    let mut cfg = config_yaml::load_config(&args.config)
        .await
        .map_err(RunError::InvalidInput)?;

    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    if let Some(timeout) = args.timeout {
        cfg.timeout = timeout;
    }

    cfg.validate()
        .map_err(|err| RunError::InvalidInput(anyhow::Error::new(err).context("invalid config")))?;

    out.print_header(&args.config, &cfg);

    let shutdown = Arc::new(ShutdownFlag::new());
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("interrupt: finishing in-flight requests, skipping the rest");
                shutdown.trigger();
            }
        });
    }

    let report = run_benchmark(&cfg, shutdown, out.progress())
        .await
        .map_err(|err| {
            RunError::RuntimeError(anyhow::Error::new(err).context("benchmark failed"))
        })?;

    out.print_report(&report).map_err(RunError::RuntimeError)?;

    if report.interrupted {
        Ok(ExitCode::Interrupted)
    } else {
        Ok(ExitCode::Success)
    }
}

pub async fn print_config(args: ConfigArgs) -> Result<(), RunError> {
    let cfg = config_yaml::load_config(&args.config)
        .await
        .map_err(RunError::InvalidInput)?;

    cfg.validate()
        .map_err(|err| RunError::InvalidInput(anyhow::Error::new(err).context("invalid config")))?;

    let doc = config_yaml::build_doc(&cfg);
    let yaml = serde_yaml::to_string(&doc)
        .map_err(|err| RunError::RuntimeError(anyhow::Error::new(err)))?;
    print!("{yaml}");

    Ok(())
}
