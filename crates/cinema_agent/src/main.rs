use std::env;
use std::fs;
use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::{Context as _, Error, anyhow};
use cinema::{CANCEL_KEY, InputEvent};
use cinema_agent::{AgentConfig, AgentEvent, PageAgent, Settings, SettingsStore};
use dom::Document;
use log::info;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use url::Url;

const USAGE: &str = "usage: cinema <page.html> [--open] [--enable]";

struct Args {
    page: PathBuf,
    keep_open: bool,
    force_enable: bool,
}

fn parse_args() -> Result<Args, Error> {
    let mut page = None;
    let mut keep_open = false;
    let mut force_enable = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--open" => keep_open = true,
            "--enable" => force_enable = true,
            other if page.is_none() && !other.starts_with("--") => page = Some(PathBuf::from(other)),
            other => return Err(anyhow!("unexpected argument {other}\n{USAGE}")),
        }
    }
    let page = page.ok_or_else(|| anyhow!(USAGE))?;
    Ok(Args {
        page,
        keep_open,
        force_enable,
    })
}

pub fn main() -> Result<(), Error> {
    env_logger::init();
    let args = parse_args()?;

    let html = fs::read_to_string(&args.page)
        .with_context(|| format!("reading {}", args.page.display()))?;
    let absolute = fs::canonicalize(&args.page)?;
    let base = Url::from_file_path(&absolute)
        .map_err(|()| anyhow!("{} is not a valid file URL", absolute.display()))?;

    let config = AgentConfig::from_env();
    let settings = match &config.settings_path {
        Some(path) => SettingsStore::new(path).load()?,
        None => Settings::default(),
    };

    let mut agent = PageAgent::new(Document::parse_html_with_base(&html, base), config);
    agent.set_enabled(settings.plugin_enabled || args.force_enable);
    match agent.current_source() {
        Some(source) => info!("player source: {source}"),
        None => info!("no player found"),
    }

    let (sender, receiver) = mpsc::channel(8);
    if let Some(trigger) = agent.controller().engine().and_then(|engine| engine.trigger()) {
        sender.try_send(AgentEvent::Input(InputEvent::Click { target: trigger }))?;
        if !args.keep_open {
            sender.try_send(AgentEvent::Input(InputEvent::key_down(CANCEL_KEY)))?;
        }
    }
    drop(sender);

    let runtime = Runtime::new()?;
    let agent = runtime.block_on(agent.run(receiver));
    info!("final state: {:?}", agent.controller().state());

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", agent.document().to_json_string())?;
    Ok(())
}
