//! Headless command line front end

use crate::{
    config::{self, Config, RenderMode},
    logic::{
        Editor, EditorOptions, EditorView, LocalRenderer, RemoteRenderer, Rendered, Renderer,
        Snapshot,
    },
    registry::EffectRegistry,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fx_client::APIConfig;
use std::{path::PathBuf, str::FromStr, sync::Arc, time::Duration};

#[derive(Parser, Debug)]
#[command(name = "pixelfx")]
#[command(version, about = "Apply photo effects locally or through a processing backend", long_about = None)]
pub struct Cli {
    /// Config file, defaults to the platform config directory
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available effects and their parameters
    Effects {
        /// Ask the processing backend instead of the built-in list
        #[arg(long)]
        remote: bool,
    },

    /// Apply effects to an image and save the result
    Apply(ApplyArgs),
}

#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Effect to enable, repeatable: <id>[:<param>=<value>,...]
    #[arg(short = 'e', long = "effect", value_name = "EFFECT", required = true)]
    pub effects: Vec<EffectArg>,

    /// Output file, defaults to <stem>_edited.<ext>
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Render through the processing backend
    #[arg(long)]
    pub remote: bool,

    /// Save the preview render instead of a full apply
    #[arg(long)]
    pub preview_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectArg {
    pub id: String,
    pub params: Vec<(String, f64)>,
}

impl FromStr for EffectArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (id, rest) = match s.split_once(':') {
            Some((id, rest)) => (id.trim(), rest),
            None => (s.trim(), ""),
        };

        if id.is_empty() {
            return Err("missing effect id".to_string());
        }

        let mut params = vec![];
        for pair in rest.split(',').filter(|pair| !pair.trim().is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(format!("expected <param>=<value>, got `{pair}`"));
            };

            let value = value
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("`{}` is not a number", value.trim()))?;
            params.push((key.trim().to_string(), value));
        }

        Ok(Self {
            id: id.to_string(),
            params,
        })
    }
}

/// Routes editor feedback to the log
#[derive(Debug, Default)]
struct ConsoleView;

impl EditorView for ConsoleView {
    fn state_changed(&self, snapshot: &Snapshot) {
        log::debug!(
            "{} active effect(s), download {}",
            snapshot.active_count,
            if snapshot.can_download { "ready" } else { "disabled" }
        );
    }

    fn busy(&self, busy: bool) {
        if busy {
            log::debug!("rendering...");
        }
    }

    fn preview(&self, rendered: Option<&Rendered>) {
        match rendered {
            Some(rendered) => log::debug!("preview updated, filter {}", rendered.filter),
            None => log::debug!("preview shows the original"),
        }
    }

    fn alert(&self, message: &str) {
        log::warn!("{message}");
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    config::init(cli.config.clone())?;
    let conf = config::all();

    match cli.command {
        Command::Effects { remote } => list_effects(&conf, remote).await,
        Command::Apply(args) => apply(&conf, args).await,
    }
}

fn client(conf: &Config) -> fx_client::Client {
    fx_client::Client::new(APIConfig {
        api_base_url: conf.remote.base_url.clone(),
        timeout_secs: conf.remote.timeout_secs,
    })
}

async fn backend(conf: &Config, remote: bool) -> Result<(EffectRegistry, Arc<dyn Renderer>)> {
    if remote || conf.render.mode == RenderMode::Remote {
        let client = client(conf);
        let registry = EffectRegistry::fetch(&client)
            .await
            .with_context(|| format!("fetch effects from {} failed", conf.remote.base_url))?;

        let renderer: Arc<dyn Renderer> =
            Arc::new(RemoteRenderer::new(client, conf.remote.request_shape));
        return Ok((registry, renderer));
    }

    let renderer: Arc<dyn Renderer> =
        Arc::new(LocalRenderer::new().with_rasterize_blur(conf.export.rasterize_blur));
    Ok((EffectRegistry::builtin(), renderer))
}

async fn list_effects(conf: &Config, remote: bool) -> Result<()> {
    let (registry, _) = backend(conf, remote).await?;

    for effect in registry.iter() {
        println!("{:<12} {} - {}", effect.id, effect.name, effect.description);
        for param in &effect.params {
            println!(
                "    {:<12} [{}, {}] step {} default {}",
                param.id, param.min, param.max, param.step, param.default
            );
        }
    }

    Ok(())
}

async fn apply(conf: &Config, args: ApplyArgs) -> Result<()> {
    let (registry, renderer) = backend(conf, args.remote).await?;
    let options = EditorOptions::default()
        .with_debounce(Duration::from_millis(conf.render.debounce_ms))
        .with_default_file_name(conf.export.default_file_name.clone());
    let editor = Editor::new(registry, renderer, Arc::new(ConsoleView), options);

    editor
        .load_file(&args.input)
        .await
        .with_context(|| format!("load {} failed", args.input.display()))?;

    for effect in &args.effects {
        editor.toggle_effect(&effect.id, true)?;
        for (param, value) in &effect.params {
            let stored = editor.set_param(&effect.id, param, *value)?;
            if stored != *value {
                log::warn!("{}.{param} clamped to {stored}", effect.id);
            }
        }
    }

    editor.cancel_pending_preview();

    let path = if args.preview_only {
        editor.preview().await;
        let Some(preview) = editor.preview_image() else {
            bail!("preview render failed");
        };

        let path = args.output.unwrap_or_else(|| PathBuf::from("preview.png"));
        preview.flattened()?.save(&path)?;
        path
    } else {
        editor.apply().await?;
        editor.download(args.output.as_deref())?
    };

    println!("{}", path.display());
    Ok(())
}
