use std::{io::Write, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Text};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;
use weather_core::{
    Config, Outcome, Session, StatusDisplay, WeatherFetcher, WeatherQuery, fetcher_from_config,
    status::forecast_lines,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup client")]
pub struct Cli {
    /// Weather server root, e.g. "http://127.0.0.1:8000". Overrides the config file.
    #[arg(long, global = true, env = "WEATHER_BASE_URL")]
    pub base_url: Option<String>,

    /// Log lookups and raw responses to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the weather server and defaults.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name, passed to the server as-is.
        city: String,

        /// Also show the multi-day forecast.
        #[arg(long)]
        forecast: bool,
    },

    /// Read city names from stdin, one per line, and show the latest result.
    Interactive {
        /// Also show the multi-day forecast.
        #[arg(long)]
        forecast: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, forecast } => {
                let config = Config::load()?.with_base_url_override(self.base_url)?;
                let fetcher = fetcher_from_config(&config)?;
                let query =
                    WeatherQuery::new(city).with_forecast(forecast || config.include_forecast);

                let outcome = fetcher.fetch(&query).await;
                println!("{}", outcome.status_line());

                match outcome {
                    Outcome::Success(result) => {
                        for line in forecast_lines(&result) {
                            println!("  {line}");
                        }
                        Ok(ExitCode::SUCCESS)
                    }
                    Outcome::Failure { .. } => Ok(ExitCode::FAILURE),
                }
            }
            Command::Interactive { forecast } => {
                let config = Config::load()?.with_base_url_override(self.base_url)?;
                let fetcher: Arc<dyn WeatherFetcher> = Arc::from(fetcher_from_config(&config)?);
                let input = BufReader::new(tokio::io::stdin());
                let mut out = std::io::stdout();
                interactive(fetcher, forecast || config.include_forecast, input, &mut out).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let current = config.base_url()?;

    let base_url = Text::new("Weather server base URL:")
        .with_default(current.as_str().trim_end_matches('/'))
        .prompt()
        .context("Failed to read base URL")?;
    config.set_base_url(base_url.trim())?;

    config.include_forecast = Confirm::new("Include the forecast by default?")
        .with_default(config.include_forecast)
        .prompt()
        .context("Failed to read forecast preference")?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// Submit every input line without waiting and write results to `out` as
/// they are accepted by the display. Ends once the input is closed and every
/// in-flight lookup has reported.
async fn interactive<R, W>(
    fetcher: Arc<dyn WeatherFetcher>,
    include_forecast: bool,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (session, mut deliveries) = Session::new(fetcher);
    let mut session = Some(session);
    let mut lines = input.lines();
    let mut display = StatusDisplay::new();

    writeln!(out, "{}", display.status())?;

    loop {
        tokio::select! {
            line = lines.next_line(), if session.is_some() => {
                match line.context("Failed to read city from input")? {
                    Some(city) => {
                        if let Some(session) = &session {
                            let query = WeatherQuery::new(city.clone())
                                .with_forecast(include_forecast);
                            let seq = session.submit(query);
                            debug!(seq, %city, "Submitted lookup");
                        }
                    }
                    // Closing the session lets the channel drain.
                    None => session = None,
                }
            }
            delivery = deliveries.recv() => {
                let Some(delivery) = delivery else { break };
                if display.apply(&delivery) {
                    writeln!(out, "{}", display.status())?;
                    for line in display.forecast() {
                        writeln!(out, "  {line}")?;
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;
    use weather_core::{WeatherResult, session::IDLE_STATUS};

    /// "Rome" waits for the test; "Paris" waits for Rome to finish, so Paris
    /// is submitted first but always reports last.
    #[derive(Debug, Default)]
    struct ChainedFetcher {
        release_rome: Notify,
        rome_done: Notify,
    }

    #[async_trait]
    impl WeatherFetcher for ChainedFetcher {
        async fn fetch(&self, query: &WeatherQuery) -> Outcome {
            match query.city.as_str() {
                "Rome" => {
                    self.release_rome.notified().await;
                    self.rome_done.notify_one();
                }
                "Paris" => self.rome_done.notified().await,
                _ => {}
            }
            Outcome::Success(WeatherResult {
                temperature: 10.0,
                description: format!("sky over {}", query.city),
                city: query.city.clone(),
                forecast: None,
            })
        }
    }

    #[tokio::test]
    async fn interactive_drains_lookups_after_input_closes() {
        let fetcher = Arc::new(ChainedFetcher::default());
        let input: &[u8] = b"Paris\nRome\n";
        let mut out = Vec::new();

        let run = interactive(fetcher.clone(), false, input, &mut out);
        let release = async {
            tokio::task::yield_now().await;
            fetcher.release_rome.notify_one();
        };

        let (res, ()) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(run, release)
        })
        .await
        .expect("loop must end once both lookups report");
        res.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![IDLE_STATUS, "🌡️ 10.0°C - Sky Over Rome"]);
    }

    #[tokio::test]
    async fn interactive_with_empty_input_prints_idle_status_and_returns() {
        let fetcher = Arc::new(ChainedFetcher::default());
        let input: &[u8] = b"";
        let mut out = Vec::new();

        interactive(fetcher, false, input, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), format!("{IDLE_STATUS}\n"));
    }

    #[test]
    fn parses_show_with_forecast_and_global_flags() {
        let cli = Cli::try_parse_from([
            "weather",
            "show",
            "New York",
            "--forecast",
            "--base-url",
            "http://10.0.0.5:8000",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.base_url.as_deref(), Some("http://10.0.0.5:8000"));
        match cli.command {
            Command::Show { city, forecast } => {
                assert_eq!(city, "New York");
                assert!(forecast);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn show_requires_a_city() {
        assert!(Cli::try_parse_from(["weather", "show"]).is_err());
    }

    #[test]
    fn parses_interactive_and_configure() {
        let cli = Cli::try_parse_from(["weather", "interactive"]).unwrap();
        assert!(matches!(cli.command, Command::Interactive { forecast: false }));

        let cli = Cli::try_parse_from(["weather", "configure"]).unwrap();
        assert!(matches!(cli.command, Command::Configure));
    }
}
