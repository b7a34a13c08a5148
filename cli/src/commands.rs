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

//! Command-line entry points.
//!
//! - `Check`: read CSDL documents, print reader diagnostics and run
//!   model validation.
//! - `Normalize`: read a CSDL document and write it back in canonical
//!   form, optionally in another EDM version.
//! - `Filter`: parse a `$filter` expression (or a whole query string)
//!   and print its canonical rendering.
//! - `BatchInspect`: walk a batch payload and list its operations.

use crate::config::ToolConfig;
use crate::Error;
use clap::Subcommand;
use odata_batch::BatchReader;
use odata_batch::OperationUrl;
use odata_batch::ReaderState;
use odata_core::EdmVersion;
use odata_csdl::CsdlReader;
use odata_csdl::CsdlWriter;
use odata_csdl::Model;
use odata_csdl::ReaderSettings;
use odata_query::uri::build_uri;
use odata_query::QueryParser;
use std::fs::read;
use std::fs::read_to_string;
use std::fs::write;
use std::io::Read as _;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Tool high-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read CSDL documents and report diagnostics and validation errors.
    Check {
        /// CSDL documents to check.
        #[arg(required = true)]
        csdls: Vec<PathBuf>,
        /// Treat reader warnings as errors.
        #[arg(long)]
        fail_on_warnings: bool,
    },
    /// Write a CSDL document back in canonical form.
    Normalize {
        /// CSDL document to read.
        input: PathBuf,
        /// Output file. Standard output when not given.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// EDM version of the output, e.g. `4.0` or `3.0`.
        #[arg(long = "edm-version")]
        version: Option<EdmVersion>,
        /// Spaces per nesting level.
        #[arg(long, conflicts_with = "compact")]
        indent: Option<usize>,
        /// Write everything on one line.
        #[arg(long)]
        compact: bool,
    },
    /// Parse a `$filter` expression and print its canonical form.
    Filter {
        /// Expression, or the whole query string with `--query`.
        expression: String,
        /// Input is a query string such as `$filter=...&$top=5`.
        #[arg(short, long)]
        query: bool,
        /// CSDL document to bind property names against.
        #[arg(short, long, requires = "entity_set")]
        metadata: Option<PathBuf>,
        /// Entity set of the default container the expression ranges over.
        #[arg(short, long, requires = "metadata")]
        entity_set: Option<String>,
        /// Print the absolute request URL below this service root.
        #[arg(long, requires_all = ["query", "entity_set"])]
        service_root: Option<Url>,
    },
    /// List the operations of a batch payload.
    BatchInspect {
        /// Batch payload.
        input: PathBuf,
        /// Content type of the payload. Detected from the content when
        /// not given.
        #[arg(short = 't', long)]
        content_type: Option<String>,
        /// Base for relative operation URLs.
        #[arg(long)]
        base_uri: Option<Url>,
    },
}

/// Process a tool command.
///
/// # Errors
///
/// Returns an error if command processing fails.
pub fn process_command(command: &Commands, config: &ToolConfig) -> Result<Vec<String>, Error> {
    let mut display_output = Vec::new();
    match command {
        Commands::Check {
            csdls,
            fail_on_warnings,
        } => {
            let mut settings = config.reader_settings();
            settings.fail_on_warnings |= *fail_on_warnings;
            for fname in csdls {
                let model = read_csdl(fname, settings, &mut display_output)?;
                let errors = model.validate();
                if !errors.is_empty() {
                    return Err(Error::Validation(
                        fname.clone(),
                        errors.iter().map(ToString::to_string).collect(),
                    ));
                }
                display_output.push(format!(
                    "{}: {} schema(s), ok",
                    fname.display(),
                    model.schemas().len()
                ));
            }
            Ok(display_output)
        }
        Commands::Normalize {
            input,
            output,
            version,
            indent,
            compact,
        } => {
            let model = read_csdl(input, config.reader_settings(), &mut Vec::new())?;
            let mut settings = config.writer_settings();
            if let Some(version) = version {
                settings.version = *version;
            }
            if *compact {
                settings.indent = None;
            } else if let Some(indent) = indent {
                settings.indent = Some(*indent);
            }
            let xml = CsdlWriter::new(settings)
                .write_to_string(&model, &config.aliases(&model))
                .map_err(Error::Write)?;
            match output {
                Some(output) => {
                    write(output, xml).map_err(|e| Error::WriteOutput(output.clone(), e))?;
                    display_output.push(format!("{} file has been written", output.display()));
                }
                None => display_output.push(xml),
            }
            Ok(display_output)
        }
        Commands::Filter {
            expression,
            query,
            metadata,
            entity_set,
            service_root,
        } => {
            let model = metadata
                .as_ref()
                .map(|fname| read_csdl(fname, config.reader_settings(), &mut Vec::new()))
                .transpose()?;
            let parser = match (&model, entity_set) {
                (Some(model), Some(name)) => QueryParser::for_entity_set(model, name)
                    .ok_or_else(|| Error::UnknownEntitySet(name.clone()))?,
                _ => QueryParser::new(),
            };
            if *query {
                let options = parser.parse_query(expression).map_err(Error::Query)?;
                match (service_root, entity_set) {
                    (Some(root), Some(name)) => {
                        let url = build_uri(root, name, &options).map_err(Error::Query)?;
                        display_output.push(url.to_string());
                    }
                    _ => display_output.push(options.to_query_string()),
                }
            } else {
                let node = parser.parse_filter(expression).map_err(Error::Expression)?;
                display_output.push(node.to_string());
            }
            Ok(display_output)
        }
        Commands::BatchInspect {
            input,
            content_type,
            base_uri,
        } => {
            let payload = read(input).map_err(|e| Error::Io(input.clone(), e))?;
            let content_type = content_type
                .clone()
                .unwrap_or_else(|| detect_content_type(&payload));
            debug!(%content_type, "batch content type");
            let mut settings = config.batch_reader_settings();
            if base_uri.is_some() {
                settings.base_uri.clone_from(base_uri);
            }
            let batch_error = |e| Error::Batch(input.clone(), e);
            let mut reader =
                BatchReader::for_content_type(payload.as_slice(), &content_type, settings)
                    .map_err(batch_error)?;
            while reader.read().map_err(batch_error)? {
                match reader.state() {
                    ReaderState::ChangesetStart => display_output.push("changeset".into()),
                    ReaderState::ChangesetEnd => display_output.push("end changeset".into()),
                    _ => {
                        let mut body = Vec::new();
                        reader
                            .body()
                            .and_then(|mut b| b.read_to_end(&mut body).map_err(Into::into))
                            .map_err(batch_error)?;
                        if let Some(op) = reader.operation() {
                            display_output.push(describe_operation(op, body.len(), reader.in_changeset()));
                        }
                    }
                }
            }
            Ok(display_output)
        }
    }
}

fn read_csdl(
    fname: &Path,
    settings: ReaderSettings,
    display_output: &mut Vec<String>,
) -> Result<Model, Error> {
    let text = read_to_string(fname).map_err(|err| Error::Io(fname.into(), err))?;
    let parsed = CsdlReader::new(settings).parse(&text);
    let lines = parsed
        .diagnostics
        .iter()
        .map(|d| format!("{}:{d}", fname.display()));
    match parsed.value {
        Some(model) => {
            display_output.extend(lines);
            Ok(model)
        }
        None => Err(Error::Csdl(fname.into(), lines.collect())),
    }
}

fn describe_operation(op: &odata_batch::Operation, body_len: usize, nested: bool) -> String {
    let indent = if nested { "  " } else { "" };
    let head = match (op.method(), op.status(), &op.target) {
        (Some(method), _, Some(target)) => format!("{method} {}", target_text(target)),
        (Some(method), _, None) => format!("{method} {}", op.raw_url().unwrap_or("")),
        (None, Some(status), _) => status.to_string(),
        (None, None, _) => String::new(),
    };
    let id = op
        .content_id
        .as_deref()
        .map(|id| format!(" [id {id}]"))
        .unwrap_or_default();
    format!("{indent}{head}{id} ({body_len} bytes)")
}

fn target_text(target: &OperationUrl) -> String {
    match target {
        OperationUrl::Absolute(url) => url.to_string(),
        OperationUrl::ContentIdReference { content_id, path } => format!("${content_id}{path}"),
        OperationUrl::Relative(url) => url.clone(),
    }
}

/// JSON when the payload starts with `{`, otherwise multipart with the
/// boundary of the first delimiter line.
fn detect_content_type(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    let text = text.trim_start();
    if text.starts_with('{') {
        return "application/json".into();
    }
    let boundary = text
        .lines()
        .find_map(|line| line.trim_end().strip_prefix("--"))
        .unwrap_or("batch");
    format!("multipart/mixed; boundary={boundary}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn content_type_detection() {
        assert_eq!(detect_content_type(b"  {\"requests\":[]}"), "application/json");
        assert_eq!(
            detect_content_type(b"preamble\r\n--batch_7\r\nContent-Type: application/http\r\n"),
            "multipart/mixed; boundary=batch_7"
        );
    }

    #[test]
    fn filter_is_rendered_canonically() {
        let command = Commands::Filter {
            expression: "((Price add 1)) mul 2 gt 10 and (not (contains(Name,'x')))".into(),
            query: false,
            metadata: None,
            entity_set: None,
            service_root: None,
        };
        let output = process_command(&command, &ToolConfig::default()).unwrap();
        assert_eq!(output, vec!["(Price add 1) mul 2 gt 10 and not contains(Name,'x')"]);
    }

    #[test]
    fn query_string_is_rendered_canonically() {
        let command = Commands::Filter {
            expression: "$top=5&$filter=Name eq 'a b'".into(),
            query: true,
            metadata: None,
            entity_set: None,
            service_root: None,
        };
        let output = process_command(&command, &ToolConfig::default()).unwrap();
        assert_eq!(output, vec!["$filter=Name%20eq%20%27a%20b%27&$top=5"]);
    }

    #[test]
    fn filter_error_is_reported() {
        let command = Commands::Filter {
            expression: "Name eq".into(),
            query: false,
            metadata: None,
            entity_set: None,
            service_root: None,
        };
        assert!(matches!(
            process_command(&command, &ToolConfig::default()),
            Err(Error::Expression(_))
        ));
    }
}
