use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use edudismiss_core::models::{Locale, Section, StudentStatus};

#[derive(Parser)]
#[command(name = "edudismiss")]
#[command(about = "School dismissal board from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Roster script endpoint (overrides EDUDISMISS_ENDPOINT_URL and the saved endpoint)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow the gate board live until Ctrl-C
    Watch {
        /// Only show one section
        #[arg(long, value_enum)]
        section: Option<SectionArg>,
        /// Only show one status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Match English name, Arabic name or student id
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Sync once and print the board
    Board {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Call a student to the gate
    Call {
        /// Student id
        id: String,
    },
    /// Mark a student as on the way
    OnTheWay {
        /// Student id
        id: String,
    },
    /// Mark a student as dismissed
    Dismiss {
        /// Student id
        id: String,
    },
    /// Put a student back in class
    ResetStatus {
        /// Student id
        id: String,
    },
    /// Sign in to the board
    Login {
        username: String,
        password: String,
    },
    /// Forget the signed-in user
    Logout,
    /// Show or change board settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Upload a logo image and use it as the board logo
    UploadLogo {
        /// Image file to upload
        path: PathBuf,
    },
    /// Return every student to class
    ResetAll,
    /// Manage local client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Turn exam mode on or off
    ExamMode {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Set the school name
    SchoolName { name: String },
    /// Set the logo URL
    LogoUrl { url: String },
    /// Set the folder that receives uploaded logos
    DriveFolder { folder_id: String },
    /// Set the dismissal window for one weekday
    Schedule {
        /// Weekday name or index (Sunday = 0)
        day: String,
        /// Window start, HH:mm
        start: String,
        /// Window end, HH:mm
        end: String,
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Save the roster script endpoint
    SetEndpoint { url: String },
    /// Save the display language
    SetLocale {
        #[arg(value_enum)]
        locale: LocaleArg,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SectionArg {
    Elementary,
    MiddleHigh,
}

impl From<SectionArg> for Section {
    fn from(value: SectionArg) -> Self {
        match value {
            SectionArg::Elementary => Self::Elementary,
            SectionArg::MiddleHigh => Self::MiddleHigh,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    InClass,
    Called,
    OnTheWay,
    Dismissed,
}

impl From<StatusArg> for StudentStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::InClass => Self::InClass,
            StatusArg::Called => Self::Called,
            StatusArg::OnTheWay => Self::OnTheWay,
            StatusArg::Dismissed => Self::Dismissed,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LocaleArg {
    En,
    Ar,
}

impl From<LocaleArg> for Locale {
    fn from(value: LocaleArg) -> Self {
        match value {
            LocaleArg::En => Self::En,
            LocaleArg::Ar => Self::Ar,
        }
    }
}
