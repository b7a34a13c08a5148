// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use odata_tool::commands::process_command;
use odata_tool::commands::Commands;
use odata_tool::config::ToolConfig;
use odata_tool::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Tool CLI.
#[derive(Parser, Debug)]
#[command(name = "odata-tool")]
#[command(about = "OData metadata, query and batch tool", long_about = None)]
struct Cli {
    /// TOML file with reader, writer and batch defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli
        .config
        .as_deref()
        .map(ToolConfig::read)
        .transpose()?
        .unwrap_or_default();
    for msg in process_command(&cli.command, &config)? {
        println!("{msg}");
    }
    Ok(())
}
