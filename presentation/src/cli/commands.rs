//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use paramlab_domain::GenerationParameters;
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for paramlab
#[derive(Parser, Debug)]
#[command(name = "paramlab")]
#[command(author, version, about = "Explore how sampling parameters shape LLM responses")]
#[command(long_about = r#"
paramlab manages prompt experiments on the parameter dashboard service:
create an experiment, generate responses under different sampling
parameters, then score and compare them.

Configuration is loaded from (in priority order):
1. --config <path>                    Explicit config file
2. PARAMLAB_* environment variables   e.g. PARAMLAB_API__BASE_URL
3. ./paramlab.toml                    Project-level config
4. ~/.config/paramlab/config.toml     Global config

Example:
  paramlab list
  paramlab run --name "Tides" --prompt "Explain tides to a child" -n 3 --preset creative
  paramlab --offline run --name demo --prompt "Write a haiku about rust"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Use the built-in in-memory backend instead of the API
    #[arg(long, global = true)]
    pub offline: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the parameter presets
    Presets,

    /// List all experiments
    List,

    /// Show one experiment with its responses
    Show {
        /// Experiment id
        id: String,
    },

    /// Create an experiment
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        params: ParameterArgs,
    },

    /// Rename or edit an experiment
    Update {
        /// Experiment id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an experiment
    Delete {
        /// Experiment id
        id: String,
    },

    /// Generate responses for an experiment
    Generate {
        /// Experiment id
        id: String,
        /// Number of responses (1-10)
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
        /// Override the experiment's parameters for this run
        #[command(flatten)]
        params: ParameterArgs,
    },

    /// Show aggregate statistics for an experiment
    Stats {
        /// Experiment id
        id: String,
    },

    /// Score every response of an experiment
    Analyze {
        /// Experiment id
        id: String,
    },

    /// Compare two or more responses
    Compare {
        /// Response ids
        #[arg(required = true, num_args = 2..)]
        response_ids: Vec<String>,
    },

    /// Create, generate and score in one go
    Run {
        #[arg(long)]
        name: String,
        #[arg(long)]
        prompt: String,
        /// Number of responses (1-10)
        #[arg(short = 'n', long, default_value_t = 3)]
        count: u32,
        #[command(flatten)]
        params: ParameterArgs,
    },

    /// Show configuration sources and issues
    Config,
}

/// Sampling parameter flags shared by several commands
#[derive(Args, Debug, Clone, Default)]
pub struct ParameterArgs {
    /// Start from a preset (creative, balanced, precise, deterministic)
    #[arg(long)]
    pub preset: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f64>,
    #[arg(long)]
    pub top_p: Option<f64>,
    #[arg(long)]
    pub top_k: Option<u32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ParameterArgs {
    /// True when no flag was given
    pub fn is_empty(&self) -> bool {
        self.preset.is_none() && !self.has_overrides()
    }

    /// True when any individual parameter flag was given
    pub fn has_overrides(&self) -> bool {
        self.model.is_some()
            || self.temperature.is_some()
            || self.top_p.is_some()
            || self.top_k.is_some()
            || self.max_tokens.is_some()
            || self.seed.is_some()
    }

    /// Apply the individual flags on top of `base`. The preset is not
    /// applied here.
    pub fn apply(&self, base: GenerationParameters) -> GenerationParameters {
        let mut params = base;
        if let Some(model) = &self.model {
            params = params.with_model(model.as_str());
        }
        if let Some(t) = self.temperature {
            params = params.with_temperature(t);
        }
        if let Some(p) = self.top_p {
            params = params.with_top_p(p);
        }
        if let Some(k) = self.top_k {
            params = params.with_top_k(k);
        }
        if let Some(max) = self.max_tokens {
            params = params.with_max_tokens(max);
        }
        if let Some(seed) = self.seed {
            params = params.with_seed(seed);
        }
        params
    }
}
