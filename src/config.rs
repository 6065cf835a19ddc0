//! Site configuration module.
//!
//! Configuration comes from the process environment (optionally seeded from a
//! `.env` file, which the CLI loads before constructing the config). Every
//! field is independently defaultable; the only variables with no default are
//! the object-store credentials and addressing, whose absence disables
//! publishing rather than failing the build.
//!
//! ## Variables
//!
//! ```text
//! AWS_ACCESS_KEY_ID         # store credentials — absent: publishing disabled
//! AWS_SECRET_ACCESS_KEY     #
//! AWS_REGION                # default: us-east-1
//! S3_BUCKET_NAME            # absent: publishing disabled
//! S3_BASE_URL               # public URL prefix for published audio
//! SITE_TITLE                # default: My Music Portfolio
//! SITE_DESCRIPTION          # default: A collection of my music tracks
//! SITE_AUTHOR               # default: Artist
//! MP3_BITRATE               # kbit/s, default: 192
//! MP3_QUALITY               # LAME VBR quality 0-9, default: 2
//! ```
//!
//! ## Validation
//!
//! [`Config::load`] reads the environment exactly once and returns the
//! immutable config together with a list of [`ConfigWarning`]s — incomplete
//! store configuration, unparseable numeric values — so the CLI can report
//! them in one place instead of scattering prints through the pipeline.
//! Warnings never abort the build.

use std::fmt;

/// Immutable site configuration, constructed once at startup and passed by
/// reference into each pipeline stage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Object-store access key. `None` disables publishing.
    pub aws_access_key: Option<String>,
    /// Object-store secret key. `None` disables publishing.
    pub aws_secret_key: Option<String>,
    /// Store region name.
    pub aws_region: String,
    /// Bucket holding published audio. `None` disables publishing.
    pub s3_bucket: Option<String>,
    /// Public base URL prefixed onto object keys. `None` disables publishing.
    pub s3_base_url: Option<String>,
    /// Site title shown on every page.
    pub site_title: String,
    /// Site description (listing page subtitle and meta tag).
    pub site_description: String,
    /// Author name shown in the page footer.
    pub site_author: String,
    /// MP3 target bitrate in kbit/s.
    pub mp3_bitrate: u32,
    /// LAME VBR quality (0 = best, 9 = worst).
    pub mp3_quality: u32,
}

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TITLE: &str = "My Music Portfolio";
const DEFAULT_DESCRIPTION: &str = "A collection of my music tracks";
const DEFAULT_AUTHOR: &str = "Artist";
const DEFAULT_BITRATE: u32 = 192;
const DEFAULT_QUALITY: u32 = 2;

/// A non-fatal configuration problem detected at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Store configuration is incomplete; audio will not be uploaded.
    PublishingDisabled { missing: Vec<&'static str> },
    /// A numeric variable did not parse; the default was used instead.
    InvalidNumber {
        var: &'static str,
        value: String,
        default: u32,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::PublishingDisabled { missing } => write!(
                f,
                "store configuration incomplete ({} unset), audio will not be uploaded",
                missing.join(", ")
            ),
            ConfigWarning::InvalidNumber {
                var,
                value,
                default,
            } => write!(f, "{var}={value:?} is not a number, using {default}"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws_access_key: None,
            aws_secret_key: None,
            aws_region: DEFAULT_REGION.to_string(),
            s3_bucket: None,
            s3_base_url: None,
            site_title: DEFAULT_TITLE.to_string(),
            site_description: DEFAULT_DESCRIPTION.to_string(),
            site_author: DEFAULT_AUTHOR.to_string(),
            mp3_bitrate: DEFAULT_BITRATE,
            mp3_quality: DEFAULT_QUALITY,
        }
    }
}

impl Config {
    /// Build the config from the process environment.
    pub fn load() -> (Self, Vec<ConfigWarning>) {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// The indirection keeps construction testable without mutating the
    /// process environment. Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let mut parse_u32 = |var: &'static str, default: u32| match get(var) {
            Some(raw) => match raw.trim().parse() {
                Ok(n) => n,
                Err(_) => {
                    warnings.push(ConfigWarning::InvalidNumber {
                        var,
                        value: raw,
                        default,
                    });
                    default
                }
            },
            None => default,
        };

        let mp3_bitrate = parse_u32("MP3_BITRATE", DEFAULT_BITRATE);
        let mp3_quality = parse_u32("MP3_QUALITY", DEFAULT_QUALITY);

        let config = Self {
            aws_access_key: get("AWS_ACCESS_KEY_ID"),
            aws_secret_key: get("AWS_SECRET_ACCESS_KEY"),
            aws_region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            s3_bucket: get("S3_BUCKET_NAME"),
            s3_base_url: get("S3_BASE_URL"),
            site_title: get("SITE_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            site_description: get("SITE_DESCRIPTION")
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            site_author: get("SITE_AUTHOR").unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            mp3_bitrate,
            mp3_quality,
        };

        let mut missing = Vec::new();
        if config.aws_access_key.is_none() {
            missing.push("AWS_ACCESS_KEY_ID");
        }
        if config.aws_secret_key.is_none() {
            missing.push("AWS_SECRET_ACCESS_KEY");
        }
        if config.s3_bucket.is_none() {
            missing.push("S3_BUCKET_NAME");
        }
        if config.s3_base_url.is_none() {
            missing.push("S3_BASE_URL");
        }
        if !missing.is_empty() {
            warnings.push(ConfigWarning::PublishingDisabled { missing });
        }

        (config, warnings)
    }

    /// Whether the store configuration is complete enough to upload.
    pub fn publishing_enabled(&self) -> bool {
        self.aws_access_key.is_some()
            && self.aws_secret_key.is_some()
            && self.s3_bucket.is_some()
            && self.s3_base_url.is_some()
    }
}

/// A documented `.env` template with every variable and its default.
///
/// Printed by the `gen-env` subcommand so a new portfolio starts from a
/// self-describing file instead of a wiki page.
pub fn stock_env_template() -> String {
    format!(
        r#"# trackfolio configuration
# All variables are optional. Without the four store variables the site
# still builds — audio is just not uploaded.

# Object store (S3-compatible)
AWS_ACCESS_KEY_ID=
AWS_SECRET_ACCESS_KEY=
AWS_REGION={DEFAULT_REGION}
S3_BUCKET_NAME=
# Public URL prefix for published audio, e.g. https://cdn.example.com
S3_BASE_URL=

# Site text
SITE_TITLE={DEFAULT_TITLE}
SITE_DESCRIPTION={DEFAULT_DESCRIPTION}
SITE_AUTHOR={DEFAULT_AUTHOR}

# Encoding
MP3_BITRATE={DEFAULT_BITRATE}
MP3_QUALITY={DEFAULT_QUALITY}
"#
    )
}
