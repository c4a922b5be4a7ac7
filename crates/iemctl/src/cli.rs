//! Clap derive structures for the `iemctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Kept free of workspace crates so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// iemctl -- deployment automation for Industrial Edge Manager
#[derive(Debug, Parser)]
#[command(
    name = "iemctl",
    version,
    about = "Automate Industrial Edge Manager deployments from the command line",
    long_about = "Drives the Industrial Edge Manager REST API: log in, resolve apps and\n\
        devices by name, and trigger deployments, installs and uninstalls.\n\n\
        `pipeline` deploys one app version to a list of devices; `standalone`\n\
        deploys to a single device.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// IEM base URL (e.g. https://iem.example.com)
    #[arg(long = "ie-url", alias = "ie_url", env = "IE_URL", global = true)]
    pub ie_url: Option<String>,

    /// IEM username
    #[arg(long, short = 'u', env = "IE_USER", global = true)]
    pub username: Option<String>,

    /// IEM password (prompted when missing on a terminal)
    #[arg(long, env = "IE_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Verify the IEM certificate against the system roots
    #[arg(long, global = true)]
    pub strict_tls: bool,

    /// Trust this PEM certificate bundle (implies --strict-tls)
    #[arg(long, value_name = "PATH", global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// What a pipeline does after a device fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnFailure {
    /// Stop and skip the remaining devices
    Abort,
    /// Keep going and report every device
    Continue,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy an app version to a comma-separated list of devices
    #[command(alias = "multi")]
    Pipeline(PipelineArgs),

    /// Deploy an app to a single device
    #[command(alias = "single")]
    Standalone(StandaloneArgs),

    /// Log in and print the bearer token
    Login,

    /// End a session
    Logout(LogoutArgs),

    /// Catalog and installed applications
    #[command(alias = "app")]
    Apps(AppsArgs),

    /// Edge devices
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Queue an app install on a device
    Install(BatchArgs),

    /// Queue an app uninstall from a device
    Uninstall(BatchArgs),

    /// Application configurations
    #[command(alias = "cfg")]
    Configs(ConfigsArgs),

    /// Catalog categories
    Categories(CategoriesArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Deployments ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PipelineArgs {
    /// Comma-separated device names, deployed in order
    #[arg(long, value_name = "NAMES")]
    pub devices: String,

    /// Application ID (falls back to APP_ID / config)
    #[arg(long, alias = "app_id")]
    pub app_id: Option<String>,

    /// Application version ID to deploy
    #[arg(long, alias = "appVersionID", alias = "app_version_id")]
    pub app_version_id: String,

    /// Behaviour after a failed device
    #[arg(long, value_enum)]
    pub on_failure: Option<OnFailure>,
}

#[derive(Debug, Args)]
pub struct StandaloneArgs {
    /// Target device name (falls back to IED_NAME / config)
    #[arg(long, alias = "device", value_name = "NAME")]
    pub devices: Option<String>,

    /// Application ID (falls back to APP_ID / config)
    #[arg(long, alias = "app_id", conflicts_with = "app_name")]
    pub app_id: Option<String>,

    /// Application title, resolved through the catalog
    #[arg(long, alias = "app_name")]
    pub app_name: Option<String>,

    /// Version to deploy; the newest version when omitted
    #[arg(long, alias = "appVersionID", alias = "app_version_id")]
    pub app_version_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogoutArgs {
    /// Token to invalidate; a fresh session is opened when omitted
    #[arg(long, env = "IE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

// ── Apps ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppsCommand {
    /// List catalog applications
    #[command(alias = "ls")]
    List,

    /// List applications installed on a device
    Installed {
        /// Device name
        #[arg(long, value_name = "NAME")]
        device: String,

        /// Only report whether this title is installed
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,
    },

    /// Look up an application ID by its exact title
    Id {
        /// Catalog title
        title: String,
    },

    /// Show the newest version ID of an application
    LatestVersion(AppSelector),

    /// Delete a developer application
    #[command(alias = "rm")]
    Delete {
        /// Application ID
        app_id: String,
    },
}

/// Names an application by ID or by title.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct AppSelector {
    /// Application ID
    #[arg(long, alias = "app_id")]
    pub app_id: Option<String>,

    /// Application title
    #[arg(long, alias = "app_name")]
    pub app_name: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List {
        /// Page size
        #[arg(long)]
        size: Option<u32>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },

    /// Resolve a device ID by scanning the device list
    Id {
        /// Device name
        name: String,
    },

    /// Resolve a device ID through the discovery endpoint
    Discover {
        /// Device name
        name: String,
    },

    /// Show whether a device has confirmed its activation
    Activation {
        /// Device name
        name: String,
    },

    /// Create a device and print its onboarding file
    Create {
        /// JSON device definition
        #[arg(long, value_name = "PATH")]
        from_file: PathBuf,
    },
}

// ── Batches ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Application ID
    #[arg(long, alias = "app-id", conflicts_with = "app_name", required_unless_present = "app_name")]
    pub app: Option<String>,

    /// Application title, resolved through the catalog
    #[arg(long, alias = "app_name")]
    pub app_name: Option<String>,

    /// Target device name
    #[arg(long, value_name = "NAME")]
    pub device: String,

    /// Defer the batch until this time (RFC 3339, e.g. 2024-01-01T00:00:00Z)
    #[arg(long, value_name = "WHEN")]
    pub schedule: Option<String>,
}

// ── Configurations ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigsArgs {
    #[command(subcommand)]
    pub command: ConfigsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigsCommand {
    /// List configuration slots of an application
    #[command(alias = "ls")]
    List {
        #[arg(long, alias = "app_id")]
        app_id: String,
    },

    /// Create a versioned configuration slot
    Add {
        #[arg(long, alias = "app_id")]
        app_id: String,

        /// Display name of the slot
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Volume path inside the app
        #[arg(long)]
        vol_path: String,

        /// Path relative to the volume
        #[arg(long, default_value = "")]
        relative_path: String,
    },

    /// Upload a file as a new configuration version
    Upload {
        #[arg(long, alias = "app_id")]
        app_id: String,

        /// Configuration slot display name
        #[arg(long)]
        config: String,

        /// File to upload
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        /// Version reference name
        #[arg(long)]
        reference_name: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Resolve a configuration slot (or version) ID by name
    #[command(disable_version_flag = true)]
    Id {
        #[arg(long, alias = "app_id")]
        app_id: String,

        /// Configuration slot display name
        name: String,

        /// Version reference name within the slot
        #[arg(long)]
        version: Option<String>,
    },
}

// ── Categories ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub command: CategoriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// List catalog categories
    #[command(alias = "ls")]
    List,

    /// Resolve a category ID by name
    Id { name: String },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration (password redacted)
    Show,

    /// Print the config file location
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
