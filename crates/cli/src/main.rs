//! Quire host binary.
//!
//! Loads the given files into a text file model manager, watches their
//! directories and feeds detected changes back to the manager, logging the
//! batched model events it reports until interrupted.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use notify::{RecursiveMode, Watcher};
use quire_event::Subscription;
use quire_textfile::disk::DiskModelFactory;
use quire_textfile::services::FileChanges;
use quire_textfile::services::hub::{ConfigurationStore, FileEvents, Lifecycle, OpenEditors};
use quire_textfile::{
	Collaborators, LoadOptions, ManagerOptions, ModelChange, Resource, TextFileModel, TextFileModelManager,
};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

mod watch;

/// Quire command line arguments.
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(about = "Keeps text file models in sync with the files behind them")]
struct Args {
	/// Files to load
	#[arg(required = true, value_name = "FILE")]
	files: Vec<PathBuf>,

	/// Keep models of externally deleted files (marked dirty) instead of closing them
	#[arg(long)]
	keep_on_delete: bool,

	/// Window for batched model events, in milliseconds
	#[arg(long, value_name = "MS", default_value_t = 250)]
	debounce_ms: u64,

	/// Load files without opening them in an editor
	#[arg(long)]
	background: bool,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

impl Args {
	fn configuration(&self) -> Value {
		json!({
			"workbench": { "editor": { "closeOnExternalFileDelete": !self.keep_on_delete } }
		})
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	info!("starting quire");

	let files = Arc::new(FileEvents::new());
	let editors = Arc::new(OpenEditors::new());
	let lifecycle = Arc::new(Lifecycle::new());
	let manager = TextFileModelManager::new(
		Collaborators {
			files: files.clone(),
			configuration: Arc::new(ConfigurationStore::new(args.configuration())),
			editors: editors.clone(),
			lifecycle: lifecycle.clone(),
			factory: Arc::new(DiskModelFactory),
		},
		ManagerOptions::default().with_debounce(Duration::from_millis(args.debounce_ms)),
	);
	let _reports = report(&manager);

	let (tx, mut rx) = mpsc::unbounded_channel();
	let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
		let _ = tx.send(event);
	})
	.context("failed to create file watcher")?;

	let mut watched = HashSet::new();
	for path in &args.files {
		let path = std::path::absolute(path).with_context(|| format!("invalid path {}", path.display()))?;
		let resource = Resource::from_path(&path)?;
		match manager.load_or_create(&resource, LoadOptions::new()).await {
			Ok(model) => info!(%resource, state = ?model.state(), "loaded"),
			Err(err) => {
				warn!(%resource, error = %err, "load failed");
				continue;
			}
		}
		if !args.background {
			editors.open(&resource);
		}
		if let Some(dir) = path.parent()
			&& watched.insert(dir.to_path_buf())
		{
			watcher
				.watch(dir, RecursiveMode::NonRecursive)
				.with_context(|| format!("failed to watch {}", dir.display()))?;
			debug!(dir = %dir.display(), "watching");
		}
	}

	if manager.is_empty() {
		anyhow::bail!("no file could be loaded");
	}
	info!(models = manager.len(), dirs = watched.len(), "ready");

	let interrupted = tokio::signal::ctrl_c();
	tokio::pin!(interrupted);
	loop {
		tokio::select! {
			event = rx.recv() => match event {
				Some(Ok(event)) => apply(&manager, &files, watch::translate(&event)).await,
				Some(Err(err)) => warn!(error = %err, "watcher error"),
				None => break,
			},
			result = &mut interrupted => {
				result.context("failed to listen for ctrl-c")?;
				info!("interrupted");
				break;
			}
		}
	}

	info!(models = manager.len(), "shutting down");
	lifecycle.shutdown();
	drop(watcher);
	Ok(())
}

/// Hands detected changes to the manager and refreshes saved models whose
/// file was rewritten.
async fn apply(manager: &TextFileModelManager, files: &FileEvents, changes: FileChanges) {
	if changes.is_empty() {
		return;
	}
	let updated: Vec<Resource> = changes
		.updated()
		.filter(|resource| manager.get(resource).is_some())
		.cloned()
		.collect();
	files.files_changed(changes);

	for resource in updated {
		let refresh = manager
			.load_or_create(&resource, LoadOptions::new().force_refresh())
			.await;
		if let Err(err) = refresh {
			warn!(%resource, error = %err, "refresh failed");
		}
	}
}

/// Logs the manager's batched events and disposals.
fn report(manager: &TextFileModelManager) -> Vec<Subscription> {
	fn log_batch(label: &'static str) -> impl Fn(&Vec<ModelChange>) + Send + Sync + 'static {
		move |batch| {
			let resources: Vec<String> = batch.iter().map(|change| change.resource.to_string()).collect();
			info!(count = batch.len(), ?resources, "models {label}");
		}
	}

	vec![
		manager.on_models_dirty().subscribe(log_batch("dirty")),
		manager.on_models_saved().subscribe(log_batch("saved")),
		manager.on_models_reverted().subscribe(log_batch("reverted")),
		manager.on_models_save_error().subscribe(log_batch("failed to save")),
		manager
			.on_model_disposed()
			.subscribe(|resource| info!(%resource, "model closed")),
	]
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::prelude::*;

	// QUIRE_LOG_DIR redirects logs to a per-process file
	if let Some(log_dir) = std::env::var("QUIRE_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("quire.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_span_events(FmtSpan::CLOSE)
				.with_target(true);

			tracing_subscriber::registry().with(filter).with(file_layer).init();

			info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose)))
		.with_writer(std::io::stderr)
		.init();
}

fn default_filter(verbose: bool) -> tracing_subscriber::EnvFilter {
	if verbose {
		tracing_subscriber::EnvFilter::new("quire=debug,quire_textfile=trace,quire_event=debug,info")
	} else {
		tracing_subscriber::EnvFilter::new("quire=info,quire_textfile=info,warn")
	}
}
