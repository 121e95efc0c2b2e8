use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::orientation::Orientation;

#[derive(Parser)]
#[command(name = "mtpad")]
#[command(about = "Turn a multi-touch touchpad into pointer motion, clicks, scrolling and drags")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Multi-touch input device (or recorded event file)
    #[arg(long, env = "MTPAD_DEVICE")]
    pub device: Option<String>,

    /// Size of one raw input_event in bytes (16 on 32-bit kernels, 24 on 64-bit)
    #[arg(long)]
    pub event_size: Option<usize>,

    /// Log pointer events instead of creating a uinput device
    #[arg(long)]
    pub dry_run: bool,

    /// Invert scroll direction
    #[arg(long)]
    pub natural_scrolling: bool,

    /// Touchpad mounting (normal, rotate-left, rotate-right, inverted)
    #[arg(long, value_parser = clap::value_parser!(Orientation))]
    pub orientation: Option<Orientation>,

    /// Path to config file
    #[arg(long, env = "MTPAD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Dump raw input events for debugging
    Dump {
        /// Device or recorded event file to dump
        device: String,
    },
}
