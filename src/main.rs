use clap::Parser;
use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use thumbalizr::config::{self, ENV_API_KEY, ENV_MAX_ATTEMPTS, ENV_POLL_INTERVAL, ENV_TIMEOUT};
use thumbalizr::{Client, Encoding, Mode, Screenshot, ScreenshotOptions, Status};

/// Thumbalizr - take website screenshots through the Thumbalizr API
#[derive(Parser, Debug)]
#[command(
    name = "thumbalizr",
    about = "Take website screenshots through the Thumbalizr API",
    after_help = "ENVIRONMENT VARIABLES:\n\
        THUMBALIZR_API_KEY          API key\n\
        THUMBALIZR_BASE_URL         API endpoint\n\
        THUMBALIZR_TIMEOUT          Request timeout (seconds)\n\
        THUMBALIZR_POLL_INTERVAL    Seconds between polls\n\
        THUMBALIZR_MAX_ATTEMPTS     Maximum number of polls"
)]
struct Args {
    /// URL of the page to capture
    url: String,

    /// API key
    #[arg(short, long, env = ENV_API_KEY, default_value = "", hide_env_values = true)]
    key: String,

    /// Thumbnail width in pixels
    #[arg(short = 'W', long, default_value_t = 0)]
    width: u32,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = 0)]
    quality: u32,

    /// Request a PNG instead of a JPEG
    #[arg(long)]
    png: bool,

    /// Capture the full page instead of the viewport
    #[arg(long)]
    page: bool,

    /// Force a new screenshot
    #[arg(short, long)]
    generate: bool,

    /// Delay after page load in milliseconds
    #[arg(short, long, default_value_t = 0)]
    delay: u32,

    /// Browser width
    #[arg(long, default_value_t = 0)]
    bwidth: u32,

    /// Browser height (only sent together with --delay)
    #[arg(long, default_value_t = 0)]
    bheight: u32,

    /// Output file or directory (default: <host>.<ext> in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds to wait between two polls
    #[arg(short, long, env = ENV_POLL_INTERVAL)]
    wait: Option<u64>,

    /// Maximum number of polls while the screenshot is processing
    #[arg(short, long, env = ENV_MAX_ATTEMPTS)]
    max_attempts: Option<u32>,

    /// Request timeout in seconds (0 disables)
    #[arg(short, long, env = ENV_TIMEOUT)]
    timeout: Option<u64>,

    /// Log request URLs and response headers
    #[arg(long)]
    debug: bool,

    /// Output result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let cfg = config::get();
    let debug = debug_enabled(&args, cfg);

    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let wait = args.wait.unwrap_or(cfg.poll.interval);
    let max_attempts = args.max_attempts.unwrap_or(cfg.poll.max_attempts);

    let mut builder = Client::builder()
        .key(args.key.clone())
        .debug(debug);
    if let Some(secs) = args.timeout {
        builder = builder.timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    let client = builder.build()?;

    let options = ScreenshotOptions::new(args.url.clone())?
        .width(args.width)
        .quality(args.quality)
        .encoding(if args.png { Encoding::Png } else { Encoding::Jpeg })
        .mode(if args.page { Mode::Page } else { Mode::Screen })
        .generate(args.generate)
        .delay(args.delay)
        .browser_width(args.bwidth)
        .browser_height(args.bheight);

    let screenshot = poll(&client, &options, wait, max_attempts);

    match screenshot.status() {
        Status::Processing => {
            report(&args, &screenshot, None)?;
            return Err("Screenshot is not finished".into());
        }
        Status::Error => {
            report(&args, &screenshot, None)?;
            return Err(format!("Screenshot failed: {}", screenshot.error()).into());
        }
        Status::Finished => {}
    }

    let saved = screenshot.save(args.output.as_deref())?;
    report(&args, &screenshot, saved.clone())?;

    if saved.is_none() {
        return Err("Screenshot could not be saved to disk".into());
    }

    Ok(())
}

/// `--debug` or `THUMBALIZR_DEBUG` turns on both the client diagnostics and
/// the `debug` log filter
fn debug_enabled(args: &Args, cfg: &config::Config) -> bool {
    args.debug || cfg.api.debug
}

/// Request the screenshot until it leaves the processing state or the
/// attempts run out
fn poll(client: &Client, options: &ScreenshotOptions, wait: u64, max_attempts: u32) -> Screenshot {
    let mut screenshot = client.screenshot_with(options);
    let mut count = 0;

    while screenshot.is_processing() && count < max_attempts {
        count += 1;
        info!(
            "Screenshot of {} is processing, retrying in {}s ({}/{})",
            options.url(),
            wait,
            count,
            max_attempts
        );
        thread::sleep(Duration::from_secs(wait));
        screenshot = client.screenshot_with(options);
    }

    if screenshot.is_processing() {
        warn!("Gave up on {} after {} polls", options.url(), count);
    }

    screenshot
}

fn report(args: &Args, screenshot: &Screenshot, saved: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    if args.json {
        let mut summary = screenshot.summary();
        summary.saved_to = saved;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if let Some(path) = saved {
        println!("Screenshot was saved to {}", path.display());
        if let Some(generated) = screenshot.generated() {
            println!("  Generated: {}", generated.to_rfc3339());
        }
        if let Some(Ok((width, height))) = screenshot.thumbnail().map(|t| t.dimensions()) {
            println!("  Size: {}x{} ({})", width, height, screenshot.encoding().extension());
        }
    }
    Ok(())
}
