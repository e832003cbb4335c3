//! Ticket document configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Wording and output location of the ticket document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketConfig {
    /// Directory the PDF is saved into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File name prefix; the file is `<prefix>_<roll_no>.pdf`.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Title printed under the QR code.
    #[serde(default = "default_event_title")]
    pub event_title: String,

    /// Line printed under the title.
    #[serde(default = "default_organisation")]
    pub organisation: String,

    /// Sentence at the bottom of the header band.
    #[serde(default = "default_instruction")]
    pub instruction: String,

    /// Bullet points of the "entry and scanning" box.
    #[serde(default = "default_scanning_points")]
    pub scanning_points: Vec<String>,

    /// Caption at the bottom edge.
    #[serde(default = "default_footer")]
    pub footer: String,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            event_title: default_event_title(),
            organisation: default_organisation(),
            instruction: default_instruction(),
            scanning_points: default_scanning_points(),
            footer: default_footer(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    "CUK_Convocation_Ticket".to_string()
}

fn default_event_title() -> String {
    "CUK CONVOCATION 2025".to_string()
}

fn default_organisation() -> String {
    "Central University of Kerala".to_string()
}

fn default_instruction() -> String {
    "Please present this ticket at the entrance for verification. Keep your QR code visible."
        .to_string()
}

fn default_scanning_points() -> Vec<String> {
    vec![
        "The first scanning point will be at Payaswini, where 10 volunteers will be deployed \
         for verification."
            .to_string(),
        "The second scanning point will be at the Pandal (main event venue).".to_string(),
        "Only those who have successfully completed the first scanning at Payaswini will be \
         permitted for second scanning at the Pandal."
            .to_string(),
    ]
}

fn default_footer() -> String {
    "CUK Convocation Ticket - 2025".to_string()
}
