use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser;
use log::{info, error, debug};

use eva::config::{EvaConfig, DEFAULT_CONFIG};
use eva::eva::{Eva, FileLoader};

#[derive(Parser)]
#[command(version, about = "evaluate eva programs written as json trees", long_about = None)]
struct Args {
	/// Config file, a missing one means defaults
	#[arg(short, long, default_value = DEFAULT_CONFIG)]
	config: PathBuf,
	/// Program files, each a json array of top level forms
	#[arg(required = true)]
	programs: Vec<PathBuf>,
}

fn run(eva: &mut Eva, path: &Path) -> Result<(), String> {
	let text = fs::read_to_string(path).map_err(|err| format!("couldn't read {}: {}", path.display(), err))?;
	let json: serde_json::Value = serde_json::from_str(&text).map_err(|err| format!("{} isn't valid json: {}", path.display(), err))?;
	let value = eva.eval_program_json(&json).map_err(|err| format!("{}: {}", path.display(), err))?;
	println!("{}", value);
	Ok(())
}

fn main() {
	let args = Args::parse();
	// config first, it decides how loud logging is
	let config = EvaConfig::load(&args.config);
	env_logger::Builder::new()
		.filter_level(log::LevelFilter::Warn)
		.filter_module("eva", config.as_ref().map(|v| v.log_filter()).unwrap_or(log::LevelFilter::Trace))
		.parse_default_env()
		.init();
	let config = match config {
		Ok(v) => v,
		Err(err) => {
			error!("{}", err);
			process::exit(1);
		},
	};
	debug!("config: {:?}", config);
	let mut eva = Eva::with_loader(Box::new(FileLoader::new(&config.module_dir)));
	let mut failed = false;
	for path in &args.programs {
		info!("running {}", path.display());
		if let Err(err) = run(&mut eva, path) {
			error!("{}", err);
			failed = true;
		}
	}
	if failed {
		process::exit(1);
	}
}
