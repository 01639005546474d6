use anyhow::{anyhow, bail, Context, Result};
use stagebench::{run_all, HarnessConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: stagebench [options]

  --items N            number of work items
  --pool-threads N     threads for the fixed pool and the baseline
  --compute-threads N  pipeline compute stage threads
  --delay-threads N    pipeline delay stage threads
  --output-threads N   pipeline output stage threads
  --batch-size N       every N-th item goes through the delay stage
  --delay-ms N         injected pause per delayed item
  -q, --quiet          do not print every computed prime
  -h, --help           show this help";

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<HarnessConfig>> {
    let mut config = HarnessConfig::default();

    while let Some(flag) = args.next() {
        if flag == "-h" || flag == "--help" {
            return Ok(None);
        }
        if flag == "-q" || flag == "--quiet" {
            config.echo = false;
            continue;
        }

        let value = args
            .next()
            .ok_or_else(|| anyhow!("missing value for {}", flag))?;
        let n: usize = value
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", flag, value))?;

        match flag.as_str() {
            "--items" => config.item_count = n,
            "--pool-threads" => config.pool_threads = n,
            "--compute-threads" => config.pipeline.compute_threads = n,
            "--delay-threads" => config.pipeline.delay_threads = n,
            "--output-threads" => config.pipeline.output_threads = n,
            "--batch-size" => config.pipeline.batch_size = n,
            "--delay-ms" => config.delay = Duration::from_millis(n as u64),
            other => bail!("unknown option {}", other),
        }
    }

    Ok(Some(config))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let Some(config) = parse_args(std::env::args().skip(1))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let reports = run_all(&config).context("benchmark run failed")?;
    for report in reports {
        println!("{}", report);
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse_args(args(&[
            "--items", "20", "--compute-threads", "2", "--delay-threads", "1",
            "--output-threads", "2", "--batch-size", "5", "--delay-ms", "0", "--quiet",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(config.item_count, 20);
        assert_eq!(config.pipeline.thread_count(), 5);
        assert_eq!(config.pipeline.batch_size, 5);
        assert_eq!(config.delay, Duration::ZERO);
        assert!(!config.echo);
    }

    #[test]
    fn primes_are_printed_unless_quiet() {
        assert!(parse_args(args(&[])).unwrap().unwrap().echo);
        assert!(!parse_args(args(&["-q"])).unwrap().unwrap().echo);
    }

    #[test]
    fn help_and_bad_input() {
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
        assert!(parse_args(args(&["--items"])).is_err());
        assert!(parse_args(args(&["--items", "many"])).is_err());
        assert!(parse_args(args(&["--bogus", "1"])).is_err());
    }
}
