use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{debug, Level};

use mailstyle::env::{core as core_env, EnvVar};
use mailstyle::parsers::html::dom::decode_html;
use mailstyle::{DocumentMode, MailstyleConfig, MailstyleError, MailstyleResult, UrlOptions};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Inline CSS into HTML e-mail
#[derive(Parser, Debug)]
#[command(name = "mailstyle", version, about)]
struct Cli {
    /// HTML file to transform; reads stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Additional stylesheet, applied after the ones the document links to
    #[arg(short, long = "css", value_name = "FILE")]
    css: Vec<PathBuf>,

    /// URL option used to make links absolute (host, port, scheme, protocol, path)
    #[arg(short, long = "url-option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    url_option: Vec<(String, String)>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory that local stylesheet links are resolved against
    #[arg(short, long, value_name = "DIR")]
    asset_root: Option<PathBuf>,

    /// Treat the input as an HTML fragment
    #[arg(short, long)]
    fragment: bool,

    /// Serialize with self-closing void elements
    #[arg(short, long)]
    xhtml: bool,

    /// Fetch stylesheets linked with absolute URLs
    #[arg(long)]
    fetch_external: bool,

    /// Drop CSS that cannot be inlined instead of keeping it in a <style> element
    #[arg(long)]
    no_keep_uninlinable: bool,

    /// Give every media query its own @media block
    #[arg(long)]
    no_merge_media: bool,

    /// Character encoding of the input
    #[arg(short, long, default_value = "utf-8")]
    encoding: String,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log pipeline steps to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print the supported environment variables and exit
    #[arg(long)]
    env_help: bool,
}

fn parse_key_value(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) => Ok((key.trim().to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got \"{}\"", pair)),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.env_help {
        print!("{}", mailstyle::env::generate_env_docs());
        return;
    }

    if let Err(error) = init_logging(cli.verbose) {
        print_error_message(&error.to_string());
        process::exit(1);
    }

    if let Err(error) = run(&cli) {
        print_error_message(&error.to_string());
        process::exit(1);
    }
}

fn init_logging(verbose: bool) -> MailstyleResult<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        core_env::LogLevel::get()?
            .parse::<Level>()
            .map_err(|error| MailstyleError::Config(error.to_string()))?
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(use_color())
        .init();
    Ok(())
}

fn run(cli: &Cli) -> MailstyleResult<()> {
    // 1. 加载配置
    let mut config = match &cli.config {
        Some(path) => MailstyleConfig::from_file(path)?,
        None => MailstyleConfig::default(),
    }
    .with_env_overrides()?;
    apply_arguments(&mut config, cli)?;

    // 2. 读取输入
    let html = read_input(cli.input.as_ref(), &cli.encoding)?;

    // 3. 构造文档
    let mut document = config.document(html)?;
    for path in &cli.css {
        debug!("Adding stylesheet {}", path.display());
        document.add_css(&fs::read_to_string(path)?);
    }

    // 4. 转换并输出
    let result = document.transform()?;
    write_output(cli.output.as_ref(), &result)
}

/// 命令行参数覆盖配置文件
fn apply_arguments(config: &mut MailstyleConfig, cli: &Cli) -> MailstyleResult<()> {
    if !cli.url_option.is_empty() {
        config.url_options = Some(UrlOptions::from_pairs(cli.url_option.iter().cloned())?);
    }
    if let Some(root) = &cli.asset_root {
        config.asset_root = Some(root.clone());
    }
    if cli.fragment {
        config.fragment = true;
    }
    if cli.xhtml {
        config.mode = DocumentMode::Xhtml;
    }
    if cli.fetch_external {
        config.fetch_external = Some(true);
    }
    if cli.no_keep_uninlinable {
        config.keep_uninlinable_css = false;
    }
    if cli.no_merge_media {
        config.merge_media_queries = false;
    }
    Ok(())
}

fn read_input(input: Option<&PathBuf>, encoding: &str) -> MailstyleResult<String> {
    let mut data = Vec::new();
    match input {
        Some(path) if path.as_os_str() != "-" => {
            data = fs::read(path)?;
        }
        _ => {
            io::stdin().read_to_end(&mut data)?;
        }
    }
    Ok(decode_html(&data, encoding))
}

fn write_output(output: Option<&PathBuf>, html: &str) -> MailstyleResult<()> {
    match output {
        Some(path) => fs::write(path, html)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn use_color() -> bool {
    !core_env::NoColor::get_or_default(false) && atty::is(atty::Stream::Stderr)
}

fn print_error_message(msg: &str) {
    if use_color() {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}
