use anyhow::{Context, bail};
use clap::Args;
use okfetch::{CancellationToken, Fetcher, Method, ReqwestTransport, RequestOptions};

#[derive(Clone, Debug, Args)]
pub struct GetArg {
    pub url: String,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: Method,

    /// Extra header, as `Name: value`
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Print response headers
    #[arg(short, long)]
    pub include: bool,

    /// Exit non-zero on a non-2xx status
    #[arg(short, long)]
    pub fail: bool,
}

fn parse_header(raw: &str) -> anyhow::Result<(&str, &str)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("malformed header {raw:?}, expected `Name: value`")
    };
    Ok((name.trim(), value.trim()))
}

fn request_options(arg: &GetArg) -> anyhow::Result<RequestOptions> {
    let mut options = RequestOptions::default().method(arg.method);
    for raw in &arg.headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value);
    }
    if let Some(data) = &arg.data {
        options = options.body(data.clone());
    }
    Ok(options)
}

pub async fn run(arg: GetArg) -> anyhow::Result<()> {
    let options = request_options(&arg)?;
    tracing::debug!(url = %arg.url, method = %arg.method, headers = arg.headers.len(), "sending request");

    let signal = CancellationToken::new();
    let on_interrupt = signal.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let fetcher = Fetcher::new(ReqwestTransport::new()?);
    let response = fetcher
        .fetch(&arg.url, options.signal(signal))
        .await
        .with_context(|| format!("request to {} failed", arg.url))?;

    tracing::info!(status = response.status(), redirected = response.redirected(), "received response");
    println!("{} {}", response.status(), response.status_text());
    if arg.include {
        println!("{}", response.headers());
    }

    let text = response.text().await.context("failed to read response body")?;
    print!("{text}");

    if arg.fail && !response.ok() {
        bail!("server responded with status {}", response.status());
    }
    Ok(())
}
