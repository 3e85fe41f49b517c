//! Feature-file parsing seam.
//!
//! Resolution never looks inside feature text itself; it hands the content to
//! a `FeatureParser` and turns each returned step group into a scenario. The
//! parsed body is opaque to discovery and only carried through for execution.
use anyhow::{anyhow, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Opaque parsed scenario body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScenarioBody(pub serde_json::Value);

/// One named unit of executable behavior returned by a parser.
#[derive(Debug, Clone, PartialEq)]
pub struct StepGroup {
    pub name: String,
    pub body: ScenarioBody,
}

impl StepGroup {
    pub fn new(name: &str, body: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            body: ScenarioBody(body),
        }
    }
}

/// Turns raw feature text into ordered step groups.
///
/// Errors are surfaced to the caller of `resolve` unchanged.
pub trait FeatureParser {
    fn parse(&self, content: &str) -> Result<Vec<StepGroup>>;
}

impl<F> FeatureParser for F
where
    F: Fn(&str) -> Result<Vec<StepGroup>>,
{
    fn parse(&self, content: &str) -> Result<Vec<StepGroup>> {
        self(content)
    }
}

/// Line-oriented Gherkin reader used by the `fdisc` binary.
///
/// Only the structure discovery needs is recognised: the feature heading, an
/// optional background, and scenario headings with their step lines. Step
/// lines of the background are prepended to every scenario body.
#[derive(Debug, Default, Clone, Copy)]
pub struct GherkinParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Feature,
    Background,
    Scenario,
}

fn heading_regex() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(r"^\s*(Feature|Background|Scenario Outline|Scenario Template|Scenario|Example|Examples|Scenarios):\s*(.*?)\s*$")
            .expect("heading regex compiles")
    })
}

const DOCSTRING_FENCES: [&str; 2] = ["\"\"\"", "```"];

#[derive(Debug, Default)]
struct Group {
    name: String,
    steps: Vec<String>,
    examples: Vec<String>,
}

/// Route a non-heading line to the section it belongs to.
fn push_step(
    section: Section,
    background: &mut Vec<String>,
    groups: &mut [Group],
    line: &str,
) -> Result<()> {
    match section {
        Section::Preamble => {
            return Err(anyhow!("feature content must start with Feature: (got {line:?})"));
        }
        // Free-form feature description.
        Section::Feature => {}
        Section::Background => background.push(line.to_string()),
        Section::Scenario => {
            if let Some(group) = groups.last_mut() {
                if group.examples.is_empty() {
                    group.steps.push(line.to_string());
                } else {
                    group.examples.push(line.to_string());
                }
            }
        }
    }
    Ok(())
}

impl FeatureParser for GherkinParser {
    fn parse(&self, content: &str) -> Result<Vec<StepGroup>> {
        let mut section = Section::Preamble;
        let mut background: Vec<String> = Vec::new();
        let mut groups: Vec<Group> = Vec::new();
        let mut docstring: Option<&str> = None;

        for line in content.lines() {
            let trimmed = line.trim();
            // Docstring lines belong to the step that opened them.
            if let Some(fence) = docstring {
                if trimmed.starts_with(fence) {
                    docstring = None;
                }
                push_step(section, &mut background, &mut groups, trimmed)?;
                continue;
            }
            if let Some(fence) = DOCSTRING_FENCES
                .into_iter()
                .find(|fence| trimmed.starts_with(fence))
            {
                docstring = Some(fence);
                push_step(section, &mut background, &mut groups, trimmed)?;
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('@') {
                continue;
            }
            if let Some(caps) = heading_regex().captures(line) {
                let keyword = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let title = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                match keyword {
                    "Feature" => section = Section::Feature,
                    "Background" => section = Section::Background,
                    // Example tables stay attached to their outline.
                    "Examples" | "Scenarios" => {
                        if let Some(group) = groups.last_mut() {
                            group.examples.push(trimmed.to_string());
                        }
                    }
                    _ => {
                        if section == Section::Preamble {
                            return Err(anyhow!("scenario {title:?} appears before Feature:"));
                        }
                        section = Section::Scenario;
                        groups.push(Group {
                            name: title.to_string(),
                            ..Group::default()
                        });
                    }
                }
                continue;
            }
            push_step(section, &mut background, &mut groups, trimmed)?;
        }
        if let Some(fence) = docstring {
            return Err(anyhow!("docstring opened with {fence} is never closed"));
        }

        if section == Section::Preamble {
            return Err(anyhow!("feature content has no Feature: heading"));
        }

        Ok(groups
            .into_iter()
            .map(|Group { name, steps, examples }| {
                let steps: Vec<String> = background.iter().cloned().chain(steps).collect();
                let mut body = serde_json::json!({ "steps": steps });
                if !examples.is_empty() {
                    body["examples"] = serde_json::json!(examples);
                }
                StepGroup {
                    name,
                    body: ScenarioBody(body),
                }
            })
            .collect())
    }
}
